//! 流式响应处理模块
use crate::{
    error::{NanoError, Result},
    types::GenerateContentResponse,
};
use async_stream::try_stream;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use log::debug;
use std::{
    pin::Pin,
    task::{Context, Poll},
};

// ================================================================================================
// 流式响应包装器
// ================================================================================================

const DONE_CHUNK: &str = "[DONE]";

/// 一个无状态的流处理器，用于解析 SSE (Server-Sent Events) 数据流
#[derive(Debug, Clone, Default)]
pub struct StreamWrapper;

impl StreamWrapper {
    /// 创建一个新的 `StreamWrapper` 实例
    ///
    /// 这是一个无状态的结构体，所以 `new` 只是 `default` 的别名
    pub fn new() -> Self {
        StreamWrapper
    }

    /// 将一个 `BytesStream` 转换为一个解析 `GenerateContentResponse` 的流
    ///
    /// 事件之间以空行分隔，`\n\n` 与 `\r\n\r\n` 都可以。
    pub fn stream<S>(&self, bytes_stream: S) -> ChunkStream
    where
        S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send + 'static,
    {
        let mut bytes_stream = Box::pin(bytes_stream);
        ChunkStream::new(try_stream! {
            let mut buffer = BytesMut::new();
            // 已确认不含分隔符起点的前缀长度，新数据到达后从这里继续查找
            let mut scanned = 0usize;
            while let Some(bytes_res) = bytes_stream.next().await {
                let bytes = bytes_res.map_err(|e| NanoError::StreamError(e.to_string()))?;
                buffer.extend_from_slice(&bytes);

                while let Some((pos, len)) = event_boundary(&buffer, scanned) {
                    let event_bytes = buffer.split_to(pos + len);
                    scanned = 0;
                    if let Some(data) = event_data(&event_bytes) {
                        yield parse_chunk(&data)?;
                    }
                }
                // 分隔符可能跨越两次读取，保留末尾 3 个字节重新检查
                scanned = buffer.len().saturating_sub(3);
            }

            if !buffer.is_empty() {
                debug!("Leftover buffer: {:?}", String::from_utf8_lossy(&buffer));
                if let Some(data) = event_data(&buffer) {
                    yield parse_chunk(&data)?;
                }
            }
        })
    }
}

/// 从 `from` 开始找到第一个事件分隔符，返回其在 `buffer` 中的位置与长度
///
/// 单次扫描，同时识别 `\n\n` 与 `\r\n\r\n`。
fn event_boundary(buffer: &[u8], from: usize) -> Option<(usize, usize)> {
    (from..buffer.len()).find_map(|i| {
        let rest = &buffer[i..];
        if rest.starts_with(b"\n\n") {
            Some((i, 2))
        } else if rest.starts_with(b"\r\n\r\n") {
            Some((i, 4))
        } else {
            None
        }
    })
}

/// 提取事件中的 `data:` 内容，多行 data 以换行拼接
fn event_data(event_bytes: &[u8]) -> Option<String> {
    let event_str = String::from_utf8_lossy(event_bytes);

    let mut data = String::new();
    for line in event_str.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with(':') {
            continue;
        }
        if let Some(content) = trimmed.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(content.trim_start());
        }
    }

    (!data.is_empty() && data != DONE_CHUNK).then_some(data)
}

fn parse_chunk(data: &str) -> Result<GenerateContentResponse> {
    serde_json::from_str(data)
        .map_err(|e| NanoError::Json(format!("Failed to parse event: '{}', error: {}", data, e)))
}

/// `Stream<Item = Result<GenerateContentResponse>>` 的简单包装
///
/// 惰性、有限、不可重启；丢弃即停止读取底层连接。
pub struct ChunkStream {
    inner: Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>,
}

impl ChunkStream {
    /// 创建一个新的 `ChunkStream`
    pub fn new(stream: impl Stream<Item = Result<GenerateContentResponse>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(stream),
        }
    }
}

impl Stream for ChunkStream {
    type Item = Result<GenerateContentResponse>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn bytes_stream(
        pieces: Vec<&'static str>,
    ) -> impl Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send + 'static {
        stream::iter(pieces.into_iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))))
    }

    async fn collect(pieces: Vec<&'static str>) -> Vec<Result<GenerateContentResponse>> {
        StreamWrapper::new().stream(bytes_stream(pieces)).collect().await
    }

    #[tokio::test]
    async fn test_parses_crlf_delimited_events() {
        let chunks = collect(vec![
            "data: {\"modelVersion\": \"a\"}\r\n\r\n",
            "data: {\"modelVersion\": \"b\"}\r\n\r\n",
        ])
        .await;
        let versions: Vec<_> = chunks
            .into_iter()
            .map(|c| c.unwrap().model_version.unwrap())
            .collect();
        assert_eq!(versions, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_event_split_across_reads() {
        let chunks = collect(vec![
            "data: {\"candidates\": [{\"content\": ",
            "{\"parts\": [{\"text\": \"hi\"}]}}]}\n",
            "\n",
        ])
        .await;
        assert_eq!(chunks.len(), 1);
        let chunk = chunks.into_iter().next().unwrap().unwrap();
        assert_eq!(chunk.first_part().unwrap().text.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_skips_comments_and_done() {
        let chunks = collect(vec![": keep-alive\n\n", "data: {}\n\n", "data: [DONE]\n\n"]).await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_ok());
    }

    #[tokio::test]
    async fn test_trailing_event_without_delimiter() {
        let chunks = collect(vec!["data: {\"modelVersion\": \"tail\"}"]).await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].as_ref().unwrap().model_version.as_deref(),
            Some("tail")
        );
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let chunks = collect(vec!["data: {not json}\n\n"]).await;
        assert!(matches!(chunks[0], Err(NanoError::Json(_))));
    }

    #[test]
    fn test_event_boundary_picks_earliest() {
        assert_eq!(event_boundary(b"a\n\nb\r\n\r\n", 0), Some((1, 2)));
        assert_eq!(event_boundary(b"a\r\n\r\nb\n\n", 0), Some((1, 4)));
        assert_eq!(event_boundary(b"a\r\nb", 0), None);
    }

    #[test]
    fn test_event_boundary_resumes_from_offset() {
        assert_eq!(event_boundary(b"a\n\nb\n\n", 3), Some((4, 2)));
        assert_eq!(event_boundary(b"abc\r\n\r\n", 1), Some((3, 4)));
        assert_eq!(event_boundary(b"a\n\n", 3), None);
    }

    #[tokio::test]
    async fn test_delimiter_split_across_reads() {
        let chunks = collect(vec![
            "data: {\"modelVersion\": \"a\"}\r\n",
            "\r",
            "\ndata: {\"modelVersion\": \"b\"}\n",
            "\n",
        ])
        .await;
        let versions: Vec<_> = chunks
            .into_iter()
            .map(|c| c.unwrap().model_version.unwrap())
            .collect();
        assert_eq!(versions, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_large_event_in_many_small_reads() {
        let payload = "A".repeat(256 * 1024);
        let event = format!(
            "data: {{\"candidates\": [{{\"content\": {{\"parts\": [{{\"inlineData\": {{\"mimeType\": \"image/png\", \"data\": \"{}\"}}}}]}}}}]}}\r\n\r\n",
            payload
        );
        let pieces: Vec<std::result::Result<Bytes, reqwest::Error>> = event
            .as_bytes()
            .chunks(1024)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        let chunks: Vec<_> = StreamWrapper::new().stream(stream::iter(pieces)).collect().await;
        assert_eq!(chunks.len(), 1);
        let chunk = chunks.into_iter().next().unwrap().unwrap();
        let inline = chunk.first_part().unwrap().inline_data.as_ref().unwrap();
        assert_eq!(inline.data.len(), payload.len());
    }
}
