use crate::image_handler::{CandidateFile, ClipboardItem, ImageLoader, LoadError, LoadedImage};
use crate::validation::get_image_from_clipboard;

/// 文件选择控件的变更事件。
#[derive(Debug, Clone, Default)]
pub struct FileInputEvent {
    pub files: Vec<CandidateFile>,
}

/// 粘贴事件；`clipboard_data` 为 `None` 表示事件不携带剪贴板数据。
#[derive(Debug, Clone, Default)]
pub struct PasteEvent {
    pub clipboard_data: Option<Vec<ClipboardItem>>,
}

/// 拖放事件。
#[derive(Debug, Clone, Default)]
pub struct DropEvent {
    pub data_transfer: Option<Vec<CandidateFile>>,
    default_prevented: bool,
}

impl DropEvent {
    pub fn new(files: Vec<CandidateFile>) -> Self {
        Self {
            data_transfer: Some(files),
            default_prevented: false,
        }
    }

    /// 阻止默认行为（拖入文件时宿主会尝试直接打开它）。
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// 处理文件选择：取第一个文件。
pub async fn handle_file_upload(
    loader: &ImageLoader,
    event: &FileInputEvent,
) -> Result<LoadedImage, LoadError> {
    let file = event.files.first().ok_or(LoadError::NoFileSelected)?;
    loader.load(file).await
}

/// 处理粘贴：取第一个图片条目。
pub async fn handle_paste(
    loader: &ImageLoader,
    event: &PasteEvent,
) -> Result<LoadedImage, LoadError> {
    let items = event.clipboard_data.as_ref().ok_or(LoadError::NoClipboardData)?;
    let file = get_image_from_clipboard(items).ok_or(LoadError::NoImageInClipboard)?;
    loader.load(&file).await
}

/// 处理拖放：先阻止默认行为，再取第一个文件。
pub async fn handle_drop(
    loader: &ImageLoader,
    event: &mut DropEvent,
) -> Result<LoadedImage, LoadError> {
    event.prevent_default();

    let file = event
        .data_transfer
        .as_ref()
        .and_then(|files| files.first())
        .ok_or(LoadError::NoFilesDropped)?;

    loader.load(file).await
}
