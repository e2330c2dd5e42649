//! 输入入口模块（分层门面）
//!
//! 三个入口（文件选择、剪贴板粘贴、拖放）各自从事件中取出候选文件，
//! 然后统一交给 `ImageLoader`，返回同一种 `Result<LoadedImage, LoadError>`。
//!
//! - `handlers`：事件 → 候选文件 → 加载
//! - `platform`：从磁盘路径 / 系统剪贴板构造事件

#[path = "input/handlers.rs"]
mod handlers;
#[path = "input/platform.rs"]
mod platform;

pub use handlers::{
    DropEvent, FileInputEvent, PasteEvent, handle_drop, handle_file_upload, handle_paste,
};
pub use platform::{
    CLIPBOARD_IMAGE_NAME, candidate_from_path, drop_event_from_paths, file_input_from_paths,
    paste_event_from_system_clipboard,
};
