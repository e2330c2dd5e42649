//! # 导出编排
//!
//! ## 设计思路
//!
//! `Exporter` 只负责编排：决定光栅化参数、把阻塞工作放进阻塞线程池、
//! 把各出口的失败映射为带用户文案的 `ExportError`。
//! 每次调用独立执行，不去重、不取消、不整体重试。
//!
//! ## 实现思路
//!
//! - PNG：无损、保留透明；JPG：质量默认 0.95，先铺白色底
//! - 下载：Data URL → 解码回字节 → `DownloadSink`
//! - 剪贴板：Blob → 以 MIME 为键的单条目 → `ClipboardSink`
//! - 分享：平台不支持时在光栅化之前返回；用户取消单独区分
//! - 光栅化失败与空结果在三个出口中原样返回，不改写成出口错误

use std::sync::Arc;
use std::time::Instant;

use super::{
    Blob, ClipboardEntry, ClipboardSink, DirectoryDownloads, DownloadSink, ExportConfig,
    ExportError, ExportFormat, ExportOptions, Frame, NoShareSupport, RasterRequest, Rasterizer,
    ShareData, ShareError, ShareFile, ShareTarget, SinkError, SystemClipboard,
};
use crate::image_handler::{decode_data_url, encode_data_url};

#[derive(Clone)]
pub struct Exporter {
    rasterizer: Arc<dyn Rasterizer>,
    clipboard: Arc<dyn ClipboardSink>,
    share: Arc<dyn ShareTarget>,
    downloads: Arc<dyn DownloadSink>,
    config: ExportConfig,
}

impl Exporter {
    /// 默认出口：系统剪贴板、系统下载目录、不支持分享。
    pub fn new(rasterizer: Arc<dyn Rasterizer>) -> Self {
        let config = ExportConfig::default();
        Self {
            rasterizer,
            clipboard: Arc::new(SystemClipboard::from_config(&config)),
            share: Arc::new(NoShareSupport),
            downloads: Arc::new(DirectoryDownloads::in_default_dir()),
            config,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_share(mut self, share: Arc<dyn ShareTarget>) -> Self {
        self.share = share;
        self
    }

    pub fn with_downloads(mut self, downloads: Arc<dyn DownloadSink>) -> Self {
        self.downloads = downloads;
        self
    }

    pub fn with_config(mut self, config: ExportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn raster_request(&self, options: &ExportOptions) -> RasterRequest {
        RasterRequest {
            format: options.format,
            quality: options.effective_quality(self.config.default_jpeg_quality),
            pixel_ratio: self.config.pixel_ratio,
            backing: match options.format {
                ExportFormat::Png => None,
                ExportFormat::Jpg => Some(self.config.jpeg_backing),
            },
        }
    }

    async fn rasterize(&self, frame: &Frame, options: &ExportOptions) -> Result<Blob, ExportError> {
        let started = Instant::now();
        let request = self.raster_request(options);
        let (logical_w, logical_h) = frame.logical_size();
        log::debug!(
            "🖼️ 开始光栅化 - 逻辑尺寸 {}x{}，倍率 {}",
            logical_w,
            logical_h,
            request.pixel_ratio
        );
        let rasterizer = Arc::clone(&self.rasterizer);
        let frame = frame.clone();

        let blob = tokio::task::spawn_blocking(move || rasterizer.rasterize(&frame, &request))
            .await
            .map_err(|e| ExportError::render(format!("线程执行失败：{}", e)))?
            .map_err(|e| {
                log::error!("❌ 光栅化失败：{}", e);
                ExportError::from(e)
            })?;

        log::info!(
            "🖼️ 导出完成 - {} {} 字节，耗时 {}ms",
            options.format.extension(),
            blob.len(),
            started.elapsed().as_millis()
        );
        Ok(blob)
    }

    /// 导出为 Data URL。
    pub async fn export_to_data_url(
        &self,
        frame: &Frame,
        options: &ExportOptions,
    ) -> Result<String, ExportError> {
        let blob = self.rasterize(frame, options).await?;
        Ok(encode_data_url(blob.mime, &blob.bytes))
    }

    /// 导出为二进制；空结果视为失败。
    pub async fn export_to_blob(&self, frame: &Frame, options: &ExportOptions) -> Result<Blob, ExportError> {
        let blob = self.rasterize(frame, options).await?;
        if blob.is_empty() {
            return Err(ExportError::EmptyBlob);
        }
        Ok(blob)
    }

    /// 保存为 `<filename>.<ext>`，返回实际写入位置。
    pub async fn download_image(
        &self,
        frame: &Frame,
        filename: &str,
        options: &ExportOptions,
    ) -> Result<std::path::PathBuf, ExportError> {
        let url = self.export_to_data_url(frame, options).await?;
        let (_, bytes) = decode_data_url(&url).map_err(|e| ExportError::download(e.to_string()))?;

        let downloads = Arc::clone(&self.downloads);
        let file_name = options.file_name(filename);
        tokio::task::spawn_blocking(move || downloads.save(&file_name, &bytes))
            .await
            .map_err(|e| ExportError::download(format!("线程执行失败：{}", e)))?
            .map_err(|SinkError(message)| {
                log::error!("❌ 保存失败：{}", message);
                ExportError::download(message)
            })
    }

    /// 写入剪贴板：单条目，以 Blob 的 MIME 为键。
    pub async fn copy_to_clipboard(&self, frame: &Frame, options: &ExportOptions) -> Result<(), ExportError> {
        let blob = self.export_to_blob(frame, options).await?;

        let clipboard = Arc::clone(&self.clipboard);
        let entry = ClipboardEntry::new(blob.mime, blob.bytes);
        tokio::task::spawn_blocking(move || clipboard.write(std::slice::from_ref(&entry)))
            .await
            .map_err(|e| ExportError::clipboard(format!("线程执行失败：{}", e)))?
            .map_err(|SinkError(message)| {
                log::error!("❌ 复制失败：{}", message);
                ExportError::clipboard(message)
            })
    }

    /// 通过平台分享 `<filename>.<ext>`。
    pub async fn share_image(
        &self,
        frame: &Frame,
        filename: &str,
        options: &ExportOptions,
    ) -> Result<(), ExportError> {
        if !self.share.is_supported() {
            return Err(ExportError::ShareUnsupported);
        }

        let blob = self.export_to_blob(frame, options).await?;

        let data = ShareData {
            files: vec![ShareFile {
                name: options.file_name(filename),
                blob,
            }],
            title: self.config.share_title.clone(),
            text: self.config.share_text.clone(),
        };

        if !self.share.can_share(&data) {
            return Err(ExportError::CannotShare);
        }

        let share = Arc::clone(&self.share);
        tokio::task::spawn_blocking(move || share.share(&data))
            .await
            .map_err(|e| ExportError::share(format!("线程执行失败：{}", e)))?
            .map_err(|e| match e {
                ShareError::Cancelled => {
                    log::info!("🚫 用户取消分享");
                    ExportError::ShareCancelled
                }
                ShareError::Failed(message) => {
                    log::error!("❌ 分享失败：{}", message);
                    ExportError::share(message)
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{CpuRasterizer, RenderError};
    use crate::state::AppSettings;
    use bytes::Bytes;
    use image::{Rgba, RgbaImage};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingRasterizer {
        calls: AtomicUsize,
        requests: Mutex<Vec<RasterRequest>>,
        empty: bool,
    }

    impl Rasterizer for RecordingRasterizer {
        fn rasterize(&self, _frame: &Frame, request: &RasterRequest) -> Result<Blob, RenderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(*request);
            Ok(Blob {
                mime: request.format.mime(),
                bytes: if self.empty {
                    Bytes::new()
                } else {
                    Bytes::from_static(b"img")
                },
            })
        }
    }

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn rasterize(&self, _frame: &Frame, _request: &RasterRequest) -> Result<Blob, RenderError> {
            Err(RenderError("canvas tainted".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        entries: Mutex<Vec<ClipboardEntry>>,
    }

    impl ClipboardSink for RecordingClipboard {
        fn write(&self, entries: &[ClipboardEntry]) -> Result<(), SinkError> {
            self.entries.lock().unwrap().extend_from_slice(entries);
            Ok(())
        }
    }

    struct RejectingClipboard;

    impl ClipboardSink for RejectingClipboard {
        fn write(&self, _entries: &[ClipboardEntry]) -> Result<(), SinkError> {
            Err(SinkError("Write permission denied".to_string()))
        }
    }

    #[derive(Default)]
    struct MemoryDownloads {
        saved: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl DownloadSink for MemoryDownloads {
        fn save(&self, file_name: &str, bytes: &[u8]) -> Result<std::path::PathBuf, SinkError> {
            self.saved.lock().unwrap().push((file_name.to_string(), bytes.to_vec()));
            Ok(std::path::PathBuf::from(file_name))
        }
    }

    struct ScriptedShare {
        can_share: bool,
        result: Result<(), ShareError>,
        shared: Mutex<Vec<ShareData>>,
    }

    impl ScriptedShare {
        fn new(can_share: bool, result: Result<(), ShareError>) -> Self {
            Self {
                can_share,
                result,
                shared: Mutex::new(Vec::new()),
            }
        }
    }

    impl ShareTarget for ScriptedShare {
        fn is_supported(&self) -> bool {
            true
        }

        fn can_share(&self, _data: &ShareData) -> bool {
            self.can_share
        }

        fn share(&self, data: &ShareData) -> Result<(), ShareError> {
            self.shared.lock().unwrap().push(data.clone());
            self.result.clone()
        }
    }

    fn frame() -> Frame {
        Frame::new(
            RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])),
            &AppSettings::default(),
        )
    }

    fn exporter(rasterizer: Arc<dyn Rasterizer>) -> Exporter {
        Exporter::new(rasterizer)
            .with_clipboard(Arc::new(RecordingClipboard::default()))
            .with_downloads(Arc::new(MemoryDownloads::default()))
    }

    #[tokio::test]
    async fn jpg_defaults_to_quality_and_white_backing() {
        let rasterizer = Arc::new(RecordingRasterizer::default());
        let url = exporter(rasterizer.clone())
            .export_to_data_url(&frame(), &ExportOptions::jpg(None))
            .await
            .unwrap();

        assert!(url.starts_with("data:image/jpeg;base64,"));
        let request = rasterizer.requests.lock().unwrap()[0];
        assert_eq!(request.quality, 0.95);
        assert_eq!(request.pixel_ratio, 2.0);
        assert_eq!(request.backing, Some(Rgba([255, 255, 255, 255])));
    }

    #[tokio::test]
    async fn png_has_no_backing() {
        let rasterizer = Arc::new(RecordingRasterizer::default());
        exporter(rasterizer.clone())
            .export_to_blob(&frame(), &ExportOptions::png())
            .await
            .unwrap();

        let request = rasterizer.requests.lock().unwrap()[0];
        assert_eq!(request.backing, None);
        assert_eq!(request.quality, 1.0);
    }

    #[tokio::test]
    async fn empty_output_is_reported() {
        let rasterizer = Arc::new(RecordingRasterizer {
            empty: true,
            ..RecordingRasterizer::default()
        });
        let err = exporter(rasterizer)
            .export_to_blob(&frame(), &ExportOptions::png())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to create blob");
    }

    #[tokio::test]
    async fn rasterizer_failure_carries_its_message() {
        let err = exporter(Arc::new(FailingRasterizer))
            .export_to_data_url(&frame(), &ExportOptions::png())
            .await
            .unwrap_err();
        assert_eq!(err, ExportError::Render("canvas tainted".to_string()));
    }

    #[tokio::test]
    async fn sink_paths_keep_render_and_empty_errors() {
        let err = exporter(Arc::new(FailingRasterizer))
            .copy_to_clipboard(&frame(), &ExportOptions::png())
            .await
            .unwrap_err();
        assert_eq!(err, ExportError::Render("canvas tainted".to_string()));
        assert_eq!(err.code(), "render_failed");

        let err = exporter(Arc::new(FailingRasterizer))
            .download_image(&frame(), "shot", &ExportOptions::png())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "render_failed");

        let err = exporter(Arc::new(RecordingRasterizer {
            empty: true,
            ..RecordingRasterizer::default()
        }))
        .with_share(Arc::new(ScriptedShare::new(true, Ok(()))))
        .share_image(&frame(), "shot", &ExportOptions::png())
        .await
        .unwrap_err();
        assert_eq!(err, ExportError::EmptyBlob);
        assert_eq!(err.code(), "empty_blob");
    }

    #[tokio::test]
    async fn oversized_style_fails_as_render_error() {
        let settings = AppSettings {
            padding: u32::MAX / 2,
            ..AppSettings::default()
        };
        let frame = Frame::new(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])), &settings);

        let err = Exporter::new(Arc::new(CpuRasterizer::new()))
            .export_to_data_url(&frame, &ExportOptions::png())
            .await
            .unwrap_err();

        let ExportError::Render(message) = &err else {
            panic!("unexpected error: {:?}", err);
        };
        assert!(message.starts_with("输出尺寸过大"), "{}", message);
        assert!(!message.contains("线程执行失败"));
    }

    #[tokio::test]
    async fn download_writes_named_file() {
        let downloads = Arc::new(MemoryDownloads::default());
        let path = exporter(Arc::new(RecordingRasterizer::default()))
            .with_downloads(downloads.clone())
            .download_image(&frame(), "shot", &ExportOptions::jpg(Some(0.5)))
            .await
            .unwrap();

        assert_eq!(path, std::path::PathBuf::from("shot.jpg"));
        let saved = downloads.saved.lock().unwrap();
        assert_eq!(saved[0], ("shot.jpg".to_string(), b"img".to_vec()));
    }

    #[tokio::test]
    async fn clipboard_receives_single_entry_keyed_by_mime() {
        let clipboard = Arc::new(RecordingClipboard::default());
        exporter(Arc::new(RecordingRasterizer::default()))
            .with_clipboard(clipboard.clone())
            .copy_to_clipboard(&frame(), &ExportOptions::png())
            .await
            .unwrap();

        let entries = clipboard.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mime, "image/png");
    }

    #[tokio::test]
    async fn clipboard_rejection_is_surfaced() {
        let err = exporter(Arc::new(RecordingRasterizer::default()))
            .with_clipboard(Arc::new(RejectingClipboard))
            .copy_to_clipboard(&frame(), &ExportOptions::png())
            .await
            .unwrap_err();
        assert_eq!(err, ExportError::Clipboard("Write permission denied".to_string()));
    }

    #[tokio::test]
    async fn unsupported_share_never_rasterizes() {
        let rasterizer = Arc::new(RecordingRasterizer::default());
        let err = exporter(rasterizer.clone())
            .share_image(&frame(), "shot", &ExportOptions::png())
            .await
            .unwrap_err();

        assert_eq!(err, ExportError::ShareUnsupported);
        assert_eq!(rasterizer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn share_outcomes_map_to_errors() {
        let cancelled = exporter(Arc::new(RecordingRasterizer::default()))
            .with_share(Arc::new(ScriptedShare::new(true, Err(ShareError::Cancelled))))
            .share_image(&frame(), "shot", &ExportOptions::png())
            .await
            .unwrap_err();
        assert_eq!(cancelled.to_string(), "Share cancelled");

        let refused = exporter(Arc::new(RecordingRasterizer::default()))
            .with_share(Arc::new(ScriptedShare::new(false, Ok(()))))
            .share_image(&frame(), "shot", &ExportOptions::png())
            .await
            .unwrap_err();
        assert_eq!(refused, ExportError::CannotShare);

        let failed = exporter(Arc::new(RecordingRasterizer::default()))
            .with_share(Arc::new(ScriptedShare::new(
                true,
                Err(ShareError::Failed("Permission denied".to_string())),
            )))
            .share_image(&frame(), "shot", &ExportOptions::png())
            .await
            .unwrap_err();
        assert_eq!(failed.to_string(), "Permission denied");
    }

    #[tokio::test]
    async fn share_payload_uses_configured_copy() {
        let share = Arc::new(ScriptedShare::new(true, Ok(())));
        exporter(Arc::new(RecordingRasterizer::default()))
            .with_share(share.clone())
            .share_image(&frame(), "shot", &ExportOptions::jpg(None))
            .await
            .unwrap();

        let shared = share.shared.lock().unwrap();
        assert_eq!(shared[0].title, "XXXnaper Screenshot");
        assert_eq!(shared[0].text, "Beautiful screenshot created with XXXnaper");
        assert_eq!(shared[0].files[0].name, "shot.jpg");
    }
}
