//! # 数据源与中间模型
//!
//! - `CandidateFile` 表示一个待加载的文件（名称、声明类型、声明体积、内容）
//! - `ClipboardItem` 表示剪贴板中的一个条目，只有部分条目能产出文件
//! - `LoadedImage` 表示加载成功的结果

use bytes::Bytes;

/// 待加载的候选文件。
///
/// `size` 为来源声明的体积，通常等于 `bytes.len()`；
/// 超限文件可以只携带声明体积而不读入内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub mime: String,
    pub size: u64,
    pub bytes: Bytes,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime: mime.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// 覆盖声明体积。
    pub fn with_declared_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }
}

/// 剪贴板条目。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    pub mime: String,
    file: Option<CandidateFile>,
}

impl ClipboardItem {
    /// 携带文件内容的条目（类型取自文件）。
    pub fn from_file(file: CandidateFile) -> Self {
        Self {
            mime: file.mime.clone(),
            file: Some(file),
        }
    }

    /// 仅有类型、无法产出文件的条目（如纯文本）。
    pub fn without_file(mime: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            file: None,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn get_as_file(&self) -> Option<CandidateFile> {
        self.file.clone()
    }
}

/// 加载成功的图片。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    /// `data:<mime>;base64,...` 形式的 Data URL。
    pub url: String,
    /// 原始文件句柄。
    pub file: CandidateFile,
    pub width: u32,
    pub height: u32,
}
