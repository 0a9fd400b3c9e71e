//! Gemini 客户端核心模块
use crate::{
    config::Config,
    error::{NanoError, Result},
    stream::{ChunkStream, StreamWrapper},
    types::GenerateContentRequest,
    utils::image_request,
};
use log::{debug, error};
use reqwest::{
    Client, RequestBuilder, Response,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use std::sync::Arc;

// ================================================================================================
// 核心客户端模块
// ================================================================================================

const API_KEY_HEADER: &str = "x-goog-api-key";

/// 图片生成客户端
///
/// 负责与 Gemini API 交互，只提供流式请求
#[derive(Debug, Clone)]
pub struct ImageClient {
    client: Arc<Client>,
    config: Arc<Config>,
    stream_handler: StreamWrapper,
}

impl ImageClient {
    /// 创建一个新的 `ImageClient` 实例
    ///
    /// 只有配置了超时才会限制请求时长；HTTP 客户端构建失败返回 `NanoError::Config`。
    pub fn new(config: Config) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_idle_timeout(config.pool_idle_timeout)
            .tcp_keepalive(config.tcp_keepalive)
            .tcp_nodelay(config.tcp_nodelay);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            error!("Failed to build reqwest client: {}", e);
            NanoError::Config(format!("无法创建 HTTP 客户端: {}", e))
        })?;

        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
            stream_handler: StreamWrapper::new(),
        })
    }

    /// 客户端使用的配置
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 构建 API 请求所需的 HTTP 标头
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&self.config.api_key)
                .map_err(|e| NanoError::InvalidRequest(format!("Invalid API key: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        Ok(headers)
    }

    /// 流式接口地址
    fn stream_endpoint(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    /// 发送 HTTP 请求并检查状态码，不做重试
    async fn call_api(&self, request_builder: RequestBuilder) -> Result<Response> {
        let response = request_builder.send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(NanoError::from_status(status.as_u16(), &body))
        }
    }

    /// 为给定的提示词发起流式图片生成请求
    pub async fn stream_generate(&self, prompt: &str) -> Result<ChunkStream> {
        self.stream_request(&image_request(prompt)).await
    }

    /// 发送任意请求体并返回响应块流
    pub async fn stream_request(&self, request: &GenerateContentRequest) -> Result<ChunkStream> {
        let endpoint = self.stream_endpoint();
        let headers = self.build_headers()?;
        debug!("POST {}", endpoint);

        let request_builder = self.client.post(&endpoint).headers(headers).json(request);
        let response = self.call_api(request_builder).await?;

        Ok(self.stream_handler.stream(response.bytes_stream()))
    }
}
