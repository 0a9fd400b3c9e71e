//! 图片提取与保存模块
//!
//! 按到达顺序扫描响应块，只看每个块第一个候选结果的第一个 part，
//! 遇到第一张非空内联图片就写入磁盘并停止消费后续数据块。
use crate::{
    client::ImageClient,
    config::Config,
    error::{NanoError, Result},
    types::{GenerateContentResponse, InlineData, SavedImage},
};
use base64::Engine;
use futures::{Stream, StreamExt};
use log::{debug, info, warn};
use std::path::PathBuf;

/// MIME 类型无法推断扩展名时使用的后缀
pub const FALLBACK_EXTENSION: &str = ".jpeg";
/// 输出文件名前缀
pub const FILE_PREFIX: &str = "generated_image_";

/// 常见图片类型的首选扩展名，优先于 `mime_guess` 的登记表
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("image/webp", ".webp"),
    ("image/bmp", ".bmp"),
    ("image/tiff", ".tiff"),
    ("image/svg+xml", ".svg"),
    ("image/x-icon", ".ico"),
];

/// 根据 MIME 类型推断文件扩展名（包含前导 `.`）
///
/// 忽略参数部分与大小写。常见图片类型使用首选扩展名（`image/jpeg` → `.jpg`）；
/// 其余类型若子类型本身就是已登记的扩展名则使用它，否则取登记表中的第一个；
/// 都没有时返回 `.jpeg`。
pub fn extension_for_mime(mime_type: &str) -> String {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if let Some((_, ext)) = PREFERRED_EXTENSIONS.iter().find(|(mime, _)| *mime == essence) {
        return ext.to_string();
    }

    let Some(extensions) = mime_guess::get_mime_extensions_str(&essence) else {
        return FALLBACK_EXTENSION.to_string();
    };

    let subtype = essence.split('/').nth(1).unwrap_or_default();
    extensions
        .iter()
        .find(|ext| **ext == subtype)
        .or_else(|| extensions.first())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

/// 取出数据块中可用的内联图片数据
///
/// 只检查第一个候选结果的第一个 part，`data` 为空视为没有数据。
pub fn first_inline_data(chunk: &GenerateContentResponse) -> Option<&InlineData> {
    chunk
        .first_part()?
        .inline_data
        .as_ref()
        .filter(|inline| !inline.data.is_empty())
}

/// 单次调用内的文件命名器
///
/// 序号从 0 开始递增，不跨进程持久化。
#[derive(Debug, Clone, Default)]
pub struct FileNamer {
    output_dir: Option<PathBuf>,
    index: usize,
}

impl FileNamer {
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        Self { output_dir, index: 0 }
    }

    /// 生成下一个文件路径并递增序号
    pub fn next_path(&mut self, extension: &str) -> PathBuf {
        let file_name = format!("{}{}{}", FILE_PREFIX, self.index, extension);
        self.index += 1;
        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}

/// 从响应流中保存第一张图片
///
/// 找到图片后立即返回，流中剩余的数据块不会被读取。
/// 流耗尽仍未找到图片时返回 `NanoError::NoImageData`，不会创建任何文件。
pub async fn save_first_image<S>(stream: S, namer: &mut FileNamer) -> Result<SavedImage>
where
    S: Stream<Item = Result<GenerateContentResponse>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut seen = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        seen += 1;

        if let Some(reason) = chunk
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            warn!("Prompt blocked by Gemini: {}", reason);
        }

        let Some(inline) = first_inline_data(&chunk) else {
            debug!(
                "Chunk {} has no inline data (finish reason: {:?})",
                seen,
                chunk.finish_reason()
            );
            continue;
        };

        let data = base64::engine::general_purpose::STANDARD.decode(inline.data.as_bytes())?;
        if data.is_empty() {
            debug!("Chunk {} carries empty inline data", seen);
            continue;
        }

        let extension = extension_for_mime(&inline.mime_type);
        let path = namer.next_path(&extension);
        tokio::fs::write(&path, &data).await?;
        info!(
            "Saved {} bytes of {} to {}",
            data.len(),
            inline.mime_type,
            path.display()
        );

        return Ok(SavedImage {
            path,
            mime_type: inline.mime_type.clone(),
            size: data.len(),
        });
    }

    if seen > 0 {
        warn!("Stream ended after {} chunks without image data", seen);
    }
    Err(NanoError::NoImageData)
}

/// 图片请求器：一个提示词最多生成一个文件
#[derive(Debug, Clone)]
pub struct ImageRequester {
    client: ImageClient,
}

impl ImageRequester {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            client: ImageClient::new(config)?,
        })
    }

    /// 发送提示词并保存返回的第一张图片
    pub async fn generate(&self, prompt: &str) -> Result<SavedImage> {
        let stream = self.client.stream_generate(prompt).await?;
        let mut namer = FileNamer::new(self.client.config().output_dir().cloned());
        save_first_image(stream, &mut namer).await
    }
}
