//! 平台适配：把桌面上的输入来源转换为入口事件。
//!
//! - 磁盘路径：先读 metadata，超限文件只携带声明体积，不读入内容；
//!   类型优先按文件签名（`infer`）识别，无法识别时按扩展名推断。
//! - 系统剪贴板：通过 `arboard` 读取 RGBA 图像并重新编码为 PNG 条目；
//!   只有文本时给出无文件的 `text/plain` 条目；剪贴板不可用时事件不携带数据。

use std::io::Cursor;
use std::path::Path;

use bytes::Bytes;
use image::RgbaImage;

use super::handlers::{DropEvent, FileInputEvent, PasteEvent};
use crate::image_handler::{CandidateFile, ClipboardItem, LoadError, LoaderConfig};

/// 剪贴板图像条目的文件名。
pub const CLIPBOARD_IMAGE_NAME: &str = "clipboard.png";

/// 从磁盘路径构造候选文件。
pub async fn candidate_from_path(
    path: impl AsRef<Path>,
    config: &LoaderConfig,
) -> Result<CandidateFile, LoadError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| LoadError::Platform(format!("无法读取文件信息 '{}': {}", path.display(), e)))?;

    if !metadata.is_file() {
        return Err(LoadError::Platform(format!("不是文件: {}", path.display())));
    }

    if metadata.len() > config.max_file_size {
        log::debug!(
            "📁 文件超出体积上限，跳过读取 - {} ({} 字节)",
            path.display(),
            metadata.len()
        );
        return Ok(CandidateFile {
            name,
            mime: mime_from_extension(path).to_string(),
            size: metadata.len(),
            bytes: Bytes::new(),
        });
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| LoadError::Platform(format!("无法读取文件 '{}': {}", path.display(), e)))?;

    let mime = sniff_mime(&bytes).unwrap_or_else(|| mime_from_extension(path));
    log::debug!("📁 读取本地文件 - {} ({}, {} 字节)", path.display(), mime, bytes.len());

    Ok(CandidateFile::new(name, mime, bytes))
}

/// 模拟文件选择控件：入口只使用第一个文件，其余路径不读取。
pub async fn file_input_from_paths<P: AsRef<Path>>(
    paths: &[P],
    config: &LoaderConfig,
) -> Result<FileInputEvent, LoadError> {
    let mut files = Vec::with_capacity(1);
    if let Some(first) = paths.first() {
        files.push(candidate_from_path(first, config).await?);
    }
    if paths.len() > 1 {
        log::debug!("📁 忽略其余 {} 个路径", paths.len() - 1);
    }
    Ok(FileInputEvent { files })
}

/// 模拟拖放：同样只读取第一个路径。
pub async fn drop_event_from_paths<P: AsRef<Path>>(
    paths: &[P],
    config: &LoaderConfig,
) -> Result<DropEvent, LoadError> {
    let event = file_input_from_paths(paths, config).await?;
    Ok(DropEvent::new(event.files))
}

/// 读取系统剪贴板，构造粘贴事件。
pub async fn paste_event_from_system_clipboard() -> Result<PasteEvent, LoadError> {
    tokio::task::spawn_blocking(read_system_clipboard)
        .await
        .map_err(|e| LoadError::Platform(format!("读取剪贴板任务异常结束: {}", e)))?
}

fn read_system_clipboard() -> Result<PasteEvent, LoadError> {
    let mut clipboard = match arboard::Clipboard::new() {
        Ok(c) => c,
        Err(err) => {
            log::warn!("⚠️ 无法打开系统剪贴板: {}", err);
            return Ok(PasteEvent::default());
        }
    };

    match clipboard.get_image() {
        Ok(image_data) => {
            let width = image_data.width as u32;
            let height = image_data.height as u32;
            let rgba = RgbaImage::from_raw(width, height, image_data.bytes.into_owned())
                .ok_or_else(|| LoadError::Platform("剪贴板图像缓冲长度异常".to_string()))?;

            let mut buf = Cursor::new(Vec::new());
            rgba.write_to(&mut buf, image::ImageFormat::Png)
                .map_err(|e| LoadError::Platform(format!("编码剪贴板图像失败: {}", e)))?;

            log::info!("📋 读取剪贴板图像 - {}x{}", width, height);
            let file = CandidateFile::new(CLIPBOARD_IMAGE_NAME, "image/png", buf.into_inner());
            Ok(PasteEvent {
                clipboard_data: Some(vec![ClipboardItem::from_file(file)]),
            })
        }
        Err(err) => {
            log::debug!("📋 剪贴板中没有图像: {}", err);
            let mut items = Vec::new();
            if clipboard.get_text().is_ok() {
                items.push(ClipboardItem::without_file("text/plain"));
            }
            Ok(PasteEvent {
                clipboard_data: Some(items),
            })
        }
    }
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    let kind = infer::get(bytes)?;
    if kind.matcher_type() == infer::MatcherType::Image {
        Some(kind.mime_type())
    } else {
        None
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_handler::pipeline::tests::png_bytes;
    use std::path::PathBuf;

    fn scratch_file(name: &str, bytes: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "shotframe-input-{}-{}",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[tokio::test]
    async fn signature_wins_over_misleading_extension() {
        let path = scratch_file("really-a-png.jpg", &png_bytes(1, 1, [0, 0, 0, 255]));

        let file = candidate_from_path(&path, &LoaderConfig::default()).await.unwrap();

        assert_eq!(file.mime, "image/png");
        assert_eq!(file.name, "really-a-png.jpg");
        assert_eq!(file.size, file.bytes.len() as u64);
    }

    #[tokio::test]
    async fn oversized_file_is_not_read() {
        let path = scratch_file("big.png", &[0_u8; 64]);
        let config = LoaderConfig {
            max_file_size: 16,
            ..LoaderConfig::default()
        };

        let file = candidate_from_path(&path, &config).await.unwrap();

        assert_eq!(file.size, 64);
        assert!(file.bytes.is_empty());
        assert_eq!(file.mime, "image/png");
    }

    #[tokio::test]
    async fn missing_path_is_a_platform_error() {
        let err = candidate_from_path("/definitely/not/here.png", &LoaderConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "platform");
    }

    #[tokio::test]
    async fn only_first_path_is_read() {
        let first = scratch_file("first.png", &png_bytes(2, 2, [5, 5, 5, 255]));
        let paths = [first, PathBuf::from("/definitely/not/here.png")];

        let upload = file_input_from_paths(&paths, &LoaderConfig::default()).await.unwrap();
        assert_eq!(upload.files.len(), 1);
        assert_eq!(upload.files[0].name, "first.png");

        let drop = drop_event_from_paths(&paths, &LoaderConfig::default()).await.unwrap();
        assert_eq!(drop.data_transfer.map(|files| files.len()), Some(1));
    }

    #[tokio::test]
    async fn no_paths_gives_empty_selection() {
        let paths: [PathBuf; 0] = [];
        let upload = file_input_from_paths(&paths, &LoaderConfig::default()).await.unwrap();
        assert!(upload.files.is_empty());
    }

    #[test]
    fn extension_fallback_covers_allowed_types() {
        assert_eq!(mime_from_extension(Path::new("a.JPEG")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("a.webp")), "image/webp");
        assert_eq!(mime_from_extension(Path::new("a")), "application/octet-stream");
    }
}
