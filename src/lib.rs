//! # NanoImage - 轻量级 Gemini 图片生成客户端
//!
//! NanoImage 把一个文本提示词发送给 Gemini 图片生成服务，
//! 并把返回的第一张图片保存到本地磁盘。
//!
//! ## 主要特性
//!
//! - 🌊 **流式响应**：基于 SSE 的流式请求，找到第一张图片即停止读取。
//! - 🔧 **灵活配置**：支持环境变量、`.env` 文件和 Builder 模式。
//! - 🛡️ **错误处理**：完善的错误类型，命令行入口统一以状态码 1 退出。
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use nanoimage::config::Config;
//! use nanoimage::error::Result;
//! use nanoimage::ImageRequester;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     // 从环境变量加载配置 (需要设置 GEMINI_API_KEY)
//!     let config = Config::from_env()?;
//!     let requester = ImageRequester::new(config)?;
//!
//!     let saved = requester.generate("一只戴帽子的猫").await?;
//!     println!("{}", saved.path.display());
//!
//!     Ok(())
//! }
//! ```

// 模块定义
pub mod client;
pub mod config;
pub mod error;
pub mod image;
pub mod stream;
pub mod types;
pub mod utils;

pub use client::ImageClient;
pub use config::Config;
pub use error::{NanoError, Result};
pub use image::{ImageRequester, extension_for_mime, save_first_image};
pub use types::SavedImage;
