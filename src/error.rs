//! 错误处理模块

use thiserror::Error;

/// NanoImage 库的统一错误类型
///
/// 提供了完整的错误分类，便于上层应用（以及命令行入口）进行精确的错误处理
#[derive(Debug, Error)]
pub enum NanoError {
    /// HTTP 请求相关错误
    #[error("HTTP请求失败: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON处理错误: {0}")]
    Json(String),

    /// API 服务端错误
    #[error("API错误: {status} - {message}")]
    Api { status: u16, message: String },

    /// 流处理相关错误
    #[error("流处理错误: {0}")]
    StreamError(String),

    /// API 请求频率限制
    #[error("请求频率超限: {0}")]
    RateLimit(String),

    /// 身份验证失败
    #[error("身份验证失败: {0}")]
    Auth(String),

    /// 指定的模型不存在
    #[error("模型不存在: {0}")]
    ModelNotFound(String),

    /// 请求参数无效
    #[error("请求参数无效: {0}")]
    InvalidRequest(String),

    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 内联数据 base64 解码失败
    #[error("图片数据解码失败: {0}")]
    Decode(String),

    /// 整个响应流中都没有图片数据
    #[error("No image data received from Gemini.")]
    NoImageData,

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// NanoImage 库的 Result 类型别名
pub type Result<T> = std::result::Result<T, NanoError>;

impl From<serde_json::Error> for NanoError {
    fn from(e: serde_json::Error) -> Self {
        NanoError::Json(e.to_string())
    }
}

impl From<base64::DecodeError> for NanoError {
    fn from(e: base64::DecodeError) -> Self {
        NanoError::Decode(e.to_string())
    }
}

impl NanoError {
    /// 根据 HTTP 状态码和响应体构造错误
    ///
    /// 响应体若是 `{"error": {"message": "..."}}` 形式，则取出其中的 message。
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.trim().to_string());

        match status {
            400 => NanoError::InvalidRequest(message),
            401 | 403 => NanoError::Auth(message),
            404 => NanoError::ModelNotFound(message),
            429 => NanoError::RateLimit(message),
            _ => NanoError::Api { status, message },
        }
    }
}
