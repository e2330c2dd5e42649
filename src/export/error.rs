//! # 导出错误模型
//!
//! `ExportError` 的 `Display` 即面向用户的提示文案。
//! 底层未给出原因时回退到各出口的通用文案（Export / Download / Copy / Share failed）。

/// 光栅化失败。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// 出口（下载目录 / 剪贴板）拒绝写入。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SinkError(pub String);

/// 导出链路错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("No image to export")]
    NoImage,

    #[error("{0}")]
    Render(String),

    #[error("Failed to create blob")]
    EmptyBlob,

    #[error("{0}")]
    Download(String),

    #[error("{0}")]
    Clipboard(String),

    #[error("Web Share API not supported")]
    ShareUnsupported,

    #[error("Cannot share this file")]
    CannotShare,

    #[error("Share cancelled")]
    ShareCancelled,

    #[error("{0}")]
    Share(String),
}

impl ExportError {
    pub(crate) fn render(message: impl Into<String>) -> Self {
        Self::Render(non_empty_or(message.into(), "Export failed"))
    }

    pub(crate) fn download(message: impl Into<String>) -> Self {
        Self::Download(non_empty_or(message.into(), "Download failed"))
    }

    pub(crate) fn clipboard(message: impl Into<String>) -> Self {
        Self::Clipboard(non_empty_or(message.into(), "Copy failed"))
    }

    pub(crate) fn share(message: impl Into<String>) -> Self {
        Self::Share(non_empty_or(message.into(), "Share failed"))
    }

    /// 稳定错误码，供前端或脚本按类型分支。
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoImage => "no_image",
            Self::Render(_) => "render_failed",
            Self::EmptyBlob => "empty_blob",
            Self::Download(_) => "download_failed",
            Self::Clipboard(_) => "clipboard_failed",
            Self::ShareUnsupported => "share_unsupported",
            Self::CannotShare => "cannot_share",
            Self::ShareCancelled => "share_cancelled",
            Self::Share(_) => "share_failed",
        }
    }
}

impl From<RenderError> for ExportError {
    fn from(error: RenderError) -> Self {
        Self::render(error.0)
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_causes_fall_back_to_generic_copy() {
        assert_eq!(ExportError::from(RenderError(String::new())).to_string(), "Export failed");
        assert_eq!(ExportError::clipboard(" ").to_string(), "Copy failed");
        assert_eq!(ExportError::share("boom").to_string(), "boom");
    }

    #[test]
    fn cancellation_has_exact_message() {
        assert_eq!(ExportError::ShareCancelled.to_string(), "Share cancelled");
        assert_eq!(ExportError::ShareCancelled.code(), "share_cancelled");
        assert_eq!(ExportError::ShareUnsupported.to_string(), "Web Share API not supported");
    }
}
