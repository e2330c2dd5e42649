//! # 错误模型模块
//!
//! `LoadError` 是加载链路对外的错误类型，`Display` 即面向用户的提示文案，
//! 读取与解码失败只给出固定的通用文案，细节写入日志。
//! `ImageError` 是解码流水线内部错误，供加载与导出两侧复用。

/// 加载链路错误。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// 类型或体积校验未通过，携带校验器给出的提示。
    #[error("{0}")]
    Validation(String),

    #[error("No file selected")]
    NoFileSelected,

    #[error("No clipboard data")]
    NoClipboardData,

    #[error("No image in clipboard")]
    NoImageInClipboard,

    #[error("No files dropped")]
    NoFilesDropped,

    #[error("Failed to read file")]
    Read,

    #[error("Failed to load image")]
    Decode,

    /// 平台适配层（磁盘 / 系统剪贴板）读取失败。
    #[error("{0}")]
    Platform(String),
}

impl LoadError {
    /// 稳定错误码，供前端或脚本按类型分支。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NoFileSelected => "no_file_selected",
            Self::NoClipboardData => "no_clipboard_data",
            Self::NoImageInClipboard => "no_image_in_clipboard",
            Self::NoFilesDropped => "no_files_dropped",
            Self::Read => "read_failed",
            Self::Decode => "decode_failed",
            Self::Platform(_) => "platform",
        }
    }
}

/// 解码流水线错误。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_failures_use_fixed_copy() {
        assert_eq!(LoadError::Read.to_string(), "Failed to read file");
        assert_eq!(LoadError::Decode.to_string(), "Failed to load image");
        assert_eq!(LoadError::Decode.code(), "decode_failed");
    }
}
