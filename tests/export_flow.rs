// End-to-end export: load a real file, rasterize on the CPU, hand off to sinks
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::{Rgba, RgbaImage};
use shotframe::export::{
    Blob, ClipboardEntry, ClipboardSink, CpuRasterizer, DirectoryDownloads, ExportError,
    ExportOptions, Exporter, Frame, RasterRequest, Rasterizer, RenderError, ShareData, ShareError,
    ShareTarget, SinkError,
};
use shotframe::image_handler::{CandidateFile, ImageLoader};
use shotframe::state::{AppSettings, BackgroundConfig, ImageStore};

fn temp_dir(label: &str) -> PathBuf {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    std::env::temp_dir().join(format!("shotframe-export-{}-{}", label, nanos))
}

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// 无背景、无留白：导出的像素只来自源图与圆角。
fn bare_settings(radius: u32) -> AppSettings {
    AppSettings {
        padding: 0,
        inset: 0,
        border_radius: radius,
        background: BackgroundConfig::image("/definitely/missing.png"),
        ..AppSettings::default()
    }
}

struct CountingRasterizer {
    inner: CpuRasterizer,
    calls: AtomicUsize,
}

impl Rasterizer for CountingRasterizer {
    fn rasterize(&self, frame: &Frame, request: &RasterRequest) -> Result<Blob, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.rasterize(frame, request)
    }
}

struct UnsupportedShare;

impl ShareTarget for UnsupportedShare {
    fn is_supported(&self) -> bool {
        false
    }

    fn share(&self, _data: &ShareData) -> Result<(), ShareError> {
        unreachable!("share must not be invoked when unsupported")
    }
}

struct CancellingShare;

impl ShareTarget for CancellingShare {
    fn is_supported(&self) -> bool {
        true
    }

    fn share(&self, _data: &ShareData) -> Result<(), ShareError> {
        Err(ShareError::Cancelled)
    }
}

#[derive(Default)]
struct CapturingClipboard {
    entries: Mutex<Vec<ClipboardEntry>>,
}

impl ClipboardSink for CapturingClipboard {
    fn write(&self, entries: &[ClipboardEntry]) -> Result<(), SinkError> {
        self.entries.lock().unwrap().extend_from_slice(entries);
        Ok(())
    }
}

#[tokio::test]
async fn loaded_image_exports_to_downloads() {
    let loader = ImageLoader::default();
    let store = ImageStore::new();
    let file = CandidateFile::new("shot.png", "image/png", png(20, 10, [10, 20, 30, 255]));
    store.set_image(loader.load(&file).await.unwrap());

    let settings = AppSettings {
        padding: 5,
        inset: 0,
        ..AppSettings::default()
    };
    let frame = Frame::from_state(&store.current(), &settings, loader.config()).unwrap();

    let dir = temp_dir("download");
    let exporter = Exporter::new(Arc::new(CpuRasterizer::new()))
        .with_downloads(Arc::new(DirectoryDownloads::new(&dir)));
    let path = exporter
        .download_image(&frame, "beautified", &ExportOptions::png())
        .await
        .unwrap();

    assert_eq!(path.file_name().unwrap(), "beautified.png");
    let written = image::open(&path).unwrap();
    assert_eq!((written.width(), written.height()), (60, 40));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn png_keeps_transparent_corners() {
    let frame = Frame::new(RgbaImage::from_pixel(16, 16, Rgba([0, 0, 255, 255])), &bare_settings(6));
    let blob = Exporter::new(Arc::new(CpuRasterizer::new()))
        .export_to_blob(&frame, &ExportOptions::png())
        .await
        .unwrap();

    assert_eq!(blob.mime, "image/png");
    let decoded = image::load_from_memory(&blob.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0)[3], 0);
    assert_eq!(decoded.get_pixel(16, 16)[3], 255);
}

#[tokio::test]
async fn jpg_flattens_onto_white() {
    let frame = Frame::new(RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 255])), &bare_settings(6));
    let url = Exporter::new(Arc::new(CpuRasterizer::new()))
        .export_to_data_url(&frame, &ExportOptions::jpg(None))
        .await
        .unwrap();

    assert!(url.starts_with("data:image/jpeg;base64,"));
    let (_, bytes) = shotframe::image_handler::decode_data_url(&url).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
    let corner = decoded.get_pixel(0, 0);
    assert!(corner.0.iter().all(|c| *c > 220), "corner should be white, got {:?}", corner);
    let center = decoded.get_pixel(16, 16);
    assert!(center.0.iter().all(|c| *c < 30), "center should stay black, got {:?}", center);
}

#[tokio::test]
async fn unsupported_share_skips_rasterizing() {
    let rasterizer = Arc::new(CountingRasterizer {
        inner: CpuRasterizer::new(),
        calls: AtomicUsize::new(0),
    });
    let frame = Frame::new(RgbaImage::from_pixel(4, 4, Rgba([1, 1, 1, 255])), &AppSettings::default());

    let err = Exporter::new(rasterizer.clone())
        .with_share(Arc::new(UnsupportedShare))
        .share_image(&frame, "shot", &ExportOptions::png())
        .await
        .unwrap_err();

    assert_eq!(err, ExportError::ShareUnsupported);
    assert_eq!(err.to_string(), "Web Share API not supported");
    assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancelled_share_has_fixed_message() {
    let frame = Frame::new(RgbaImage::from_pixel(4, 4, Rgba([1, 1, 1, 255])), &AppSettings::default());
    let err = Exporter::new(Arc::new(CpuRasterizer::new()))
        .with_share(Arc::new(CancellingShare))
        .share_image(&frame, "shot", &ExportOptions::png())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Share cancelled");
    assert_eq!(err.code(), "share_cancelled");
}

#[tokio::test]
async fn clipboard_gets_jpeg_entry_for_jpg_export() {
    let clipboard = Arc::new(CapturingClipboard::default());
    let frame = Frame::new(RgbaImage::from_pixel(4, 4, Rgba([1, 1, 1, 255])), &AppSettings::default());
    Exporter::new(Arc::new(CpuRasterizer::new()))
        .with_clipboard(clipboard.clone())
        .copy_to_clipboard(&frame, &ExportOptions::jpg(Some(0.6)))
        .await
        .unwrap();

    let entries = clipboard.entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].mime, "image/jpeg");
    assert_eq!(&entries[0].bytes[..2], &[0xFF, 0xD8]);
}
