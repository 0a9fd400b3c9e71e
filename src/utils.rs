//! 工具函数模块
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Modality, Part, Role};

/// 创建纯文本内容的便捷函数
///
/// # 参数
///
/// * `role` - 内容角色
/// * `text` - 文本内容，原样传递
///
/// # 返回
///
/// 只包含一个文本 part 的内容实例
pub fn text_content(role: Role, text: &str) -> Content {
    Content {
        role: Some(role),
        parts: Some(vec![Part {
            text: Some(text.to_string()),
            inline_data: None,
        }]),
    }
}

/// 为提示词构建图片生成请求
///
/// 单条用户消息，同时请求 `IMAGE` 和 `TEXT` 两种响应模态。
pub fn image_request(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![text_content(Role::User, prompt)],
        generation_config: GenerationConfig {
            response_modalities: vec![Modality::Image, Modality::Text],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_creation() {
        let content = text_content(Role::User, "Hello");
        assert_eq!(content.role, Some(Role::User));
        let parts = content.parts.unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].text.as_deref(), Some("Hello"));
        assert!(parts[0].inline_data.is_none());
    }

    #[test]
    fn test_image_request_keeps_prompt_verbatim() {
        let prompt = "  a cat\nwearing a \"hat\"  ";
        let req = image_request(prompt);
        assert_eq!(req.contents.len(), 1);
        let parts = req.contents[0].parts.as_ref().unwrap();
        assert_eq!(parts[0].text.as_deref(), Some(prompt));
    }

    #[test]
    fn test_image_request_asks_for_both_modalities() {
        let req = image_request("x");
        assert_eq!(
            req.generation_config.response_modalities,
            vec![Modality::Image, Modality::Text]
        );
    }
}
