//! 文件校验模块
//!
//! 纯函数：检查候选文件的声明类型与体积，扫描剪贴板条目中的图片。
//! 校验失败通过 `ValidationResult` 返回，不产生错误也不 panic。

use serde::Serialize;

use crate::image_handler::{CandidateFile, ClipboardItem, LoaderConfig};

/// 类型不在白名单内时的提示。
pub const INVALID_TYPE_MESSAGE: &str = "Invalid file type. Allowed types: PNG, JPG, WEBP, GIF";

/// 校验结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }
}

/// 按默认策略校验文件类型与体积。
pub fn validate_image_file(file: &CandidateFile) -> ValidationResult {
    validate_image_file_with(file, &LoaderConfig::default())
}

/// 按给定策略校验文件：先查类型，再查体积。
pub fn validate_image_file_with(file: &CandidateFile, config: &LoaderConfig) -> ValidationResult {
    if !config.is_allowed_type(&file.mime) {
        return ValidationResult::invalid(INVALID_TYPE_MESSAGE);
    }

    if file.size > config.max_file_size {
        return ValidationResult::invalid(format!(
            "File too large. Maximum size: {}",
            config.max_file_size_label()
        ));
    }

    ValidationResult::ok()
}

/// 剪贴板中是否存在图片条目。
pub fn has_image_in_clipboard(items: &[ClipboardItem]) -> bool {
    items.iter().any(ClipboardItem::is_image)
}

/// 取第一个图片条目对应的文件；该条目无法产出文件时返回 `None`。
pub fn get_image_from_clipboard(items: &[ClipboardItem]) -> Option<CandidateFile> {
    items
        .iter()
        .find(|item| item.is_image())
        .and_then(ClipboardItem::get_as_file)
}
