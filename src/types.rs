//! API 数据结构模块

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ================================================================================================
// API 请求结构
// ================================================================================================

/// `generateContent` / `streamGenerateContent` 请求体
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// 对话内容
    pub contents: Vec<Content>,
    /// 生成配置
    pub generation_config: GenerationConfig,
}

/// 生成配置
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// 期望的响应模态，图片模型要求同时包含 `IMAGE` 和 `TEXT`
    pub response_modalities: Vec<Modality>,
}

/// 响应模态
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Image,
    Text,
}

/// 角色枚举
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 用户
    #[default]
    User,
    /// 模型
    Model,
}

// ================================================================================================
// 请求与响应共用结构
// ================================================================================================

/// 一条内容，由若干 part 组成
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Content {
    /// 角色
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// 内容片段；响应中可能缺失
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,
}

/// 内容片段：文本或内联二进制数据
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// 文本
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// 内联数据
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// 内联二进制数据，`data` 为 base64 编码
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    /// MIME 类型
    #[serde(default)]
    pub mime_type: String,
    /// base64 编码的数据
    #[serde(default)]
    pub data: String,
}

// ================================================================================================
// 流式 API 响应结构
// ================================================================================================

/// 流式响应中的一个数据块
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// 候选结果
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    /// 提示词反馈（被拦截时出现）
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    /// 模型版本
    #[serde(default)]
    pub model_version: Option<String>,
}

/// 候选结果
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// 内容
    #[serde(default)]
    pub content: Option<Content>,
    /// 结束原因
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// 提示词反馈
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// 第一个候选结果的第一个 part
    ///
    /// 候选列表、内容或 part 列表任一缺失或为空时返回 `None`。
    pub fn first_part(&self) -> Option<&Part> {
        self.candidates
            .as_deref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_deref()?
            .first()
    }

    /// 第一个候选结果的结束原因
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .as_deref()?
            .first()?
            .finish_reason
            .as_deref()
    }
}

// ================================================================================================
// 应用内部数据模型
// ================================================================================================

/// 已保存到磁盘的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    /// 文件路径
    pub path: PathBuf,
    /// 服务端声明的 MIME 类型
    pub mime_type: String,
    /// 写入的字节数
    pub size: usize,
}
