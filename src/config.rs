//! 配置模块
use crate::error::{NanoError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

// ===============================================================================================
// 配置模块
// ===============================================================================================

/// 保存凭证的环境变量名
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// 默认的图片生成模型
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-preview-image-generation";
/// 默认的 API 基础 URL
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 图片生成客户端配置
///
/// 包含所有必要的配置参数，支持 Builder 模式和环境变量配置
#[derive(Debug, Clone)]
pub struct Config {
    /// 模型名称
    pub(crate) model: String,
    /// 请求超时时间，`None` 表示不限时
    pub(crate) timeout: Option<Duration>,
    /// API 基础 URL
    pub(crate) api_base: String,
    /// API 密钥
    pub(crate) api_key: String,
    /// 图片输出目录，`None` 表示当前工作目录
    pub(crate) output_dir: Option<PathBuf>,
    /// 连接池空闲超时时间
    pub(crate) pool_idle_timeout: Duration,
    /// TCP Keepalive
    pub(crate) tcp_keepalive: Duration,
    /// TCP Nodelay
    pub(crate) tcp_nodelay: bool,
}

impl Default for Config {
    /// 创建默认配置
    ///
    /// 凭证为空，必须通过 `from_env` 或 `with_api_key` 提供
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            timeout: None,
            api_base: DEFAULT_API_BASE.into(),
            api_key: String::new(),
            output_dir: None,
            pool_idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Duration::from_secs(60),
            tcp_nodelay: true,
        }
    }
}

/// 生成 Config Builder 方法的宏
///
/// 自动生成 `with_field_name` 形式的 builder 方法
macro_rules! config_builder {
    ($field:ident, $type:ty) => {
        paste::paste! {
            #[doc = "设置 `"]
            #[doc = stringify!($field)]
            #[doc = "`"]
            pub fn [<with_ $field>](mut self, $field: $type) -> Self {
                self.$field = $field;
                self
            }
        }
    };
    ($field:ident, $type:ty, option) => {
        paste::paste! {
            #[doc = "设置 `"]
            #[doc = stringify!($field)]
            #[doc = "`"]
            pub fn [<with_ $field>](mut self, $field: $type) -> Self {
                self.$field = Some($field);
                self
            }
        }
    };
}

impl Config {
    pub fn model(&self) -> &str { &self.model }
    pub fn timeout(&self) -> Option<Duration> { self.timeout }
    pub fn api_base(&self) -> &str { &self.api_base }
    pub fn api_key(&self) -> &str { &self.api_key }
    pub fn output_dir(&self) -> Option<&PathBuf> { self.output_dir.as_ref() }

    /// 从环境变量和 `.env` 文件加载配置
    ///
    /// 环境变量会覆盖 `.env` 文件中的设置。`GEMINI_API_KEY` 缺失或为空时返回
    /// `NanoError::Config`。
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| NanoError::Config(format!("{} not found in environment.", API_KEY_VAR)))?;

        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_base = env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let mut config = Config {
            api_key,
            model,
            api_base,
            ..Default::default()
        };

        if let Ok(secs) = env::var("GEMINI_TIMEOUT_SECS") {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                NanoError::Config(format!("GEMINI_TIMEOUT_SECS 无效 '{}': {}", secs, e))
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    // 使用宏生成 builder 方法
    config_builder!(api_base, String);
    config_builder!(model, String);
    config_builder!(api_key, String);
    config_builder!(timeout, Duration, option);
    config_builder!(output_dir, PathBuf, option);
    config_builder!(pool_idle_timeout, Duration);
    config_builder!(tcp_keepalive, Duration);
    config_builder!(tcp_nodelay, bool);
}
