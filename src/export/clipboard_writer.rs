//! # 剪贴板出口
//!
//! ## 设计思路
//!
//! 导出结果以“MIME → 字节”条目的形式交给 `ClipboardSink`，与网页端
//! `ClipboardItem({ [blob.type]: blob })` 保持同样的数据形状。
//!
//! ## 实现思路
//!
//! `SystemClipboard` 基于 `arboard`：
//! 1. 打开剪贴板之前先把图片字节解码为 RGBA，缩短持有剪贴板的时间
//! 2. 写入失败按错误类型分级：被占用 / 暂时性错误重试，不支持的平台直接失败
//! 3. 重试间隔指数退避，带少量抖动，并受单次上限约束

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;

use super::{ExportConfig, SinkError};

/// 一条剪贴板数据。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardEntry {
    pub mime: String,
    pub bytes: Bytes,
}

impl ClipboardEntry {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }
}

/// 剪贴板写入端口。实现方在阻塞线程中被调用。
pub trait ClipboardSink: Send + Sync {
    fn write(&self, entries: &[ClipboardEntry]) -> Result<(), SinkError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClipboardFailureKind {
    Busy,
    Transient,
    Fatal,
}

#[derive(Debug, Clone)]
struct ClipboardWriteFailure {
    kind: ClipboardFailureKind,
    message: String,
}

impl ClipboardWriteFailure {
    fn is_retryable(&self) -> bool {
        matches!(self.kind, ClipboardFailureKind::Busy | ClipboardFailureKind::Transient)
    }
}

impl From<arboard::Error> for ClipboardWriteFailure {
    fn from(error: arboard::Error) -> Self {
        let kind = match &error {
            arboard::Error::ClipboardOccupied => ClipboardFailureKind::Busy,
            arboard::Error::ClipboardNotSupported | arboard::Error::ConversionFailure => {
                ClipboardFailureKind::Fatal
            }
            _ => ClipboardFailureKind::Transient,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

/// 系统剪贴板。
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    retries: u32,
    retry_delay_ms: u64,
    retry_max_delay_ms: u64,
}

impl SystemClipboard {
    pub fn new(retries: u32, retry_delay_ms: u64, retry_max_delay_ms: u64) -> Self {
        Self {
            retries,
            retry_delay_ms,
            retry_max_delay_ms,
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(
            config.clipboard_retries,
            config.clipboard_retry_delay_ms,
            config.clipboard_retry_max_delay_ms,
        )
    }

    fn write_once(payload: &Payload) -> Result<(), ClipboardWriteFailure> {
        let mut clipboard = arboard::Clipboard::new()?;
        match payload {
            Payload::Image { width, height, rgba } => clipboard.set_image(arboard::ImageData {
                width: *width,
                height: *height,
                bytes: Cow::Borrowed(rgba.as_slice()),
            })?,
            Payload::Text(text) => clipboard.set_text(text.as_str())?,
        }
        Ok(())
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::from_config(&ExportConfig::default())
    }
}

enum Payload {
    Image { width: usize, height: usize, rgba: Vec<u8> },
    Text(String),
}

/// 选出第一条可写入的条目：图片优先，其次纯文本。
fn prepare_payload(entries: &[ClipboardEntry]) -> Result<Payload, SinkError> {
    if let Some(entry) = entries.iter().find(|e| e.mime.starts_with("image/")) {
        let rgba = image::load_from_memory(&entry.bytes)
            .map_err(|e| SinkError(format!("剪贴板图片解码失败：{}", e)))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        return Ok(Payload::Image {
            width: width as usize,
            height: height as usize,
            rgba: rgba.into_raw(),
        });
    }

    if let Some(entry) = entries.iter().find(|e| e.mime.starts_with("text/plain")) {
        let text = String::from_utf8(entry.bytes.to_vec())
            .map_err(|e| SinkError(format!("剪贴板文本不是 UTF-8：{}", e)))?;
        return Ok(Payload::Text(text));
    }

    Err(SinkError("没有可写入剪贴板的条目".to_string()))
}

impl ClipboardSink for SystemClipboard {
    fn write(&self, entries: &[ClipboardEntry]) -> Result<(), SinkError> {
        let payload = prepare_payload(entries)?;

        let attempts = self.retries.max(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            if attempt > 1 {
                let wait_ms = compute_backoff_delay_with_jitter(
                    self.retry_delay_ms.max(1),
                    attempt - 1,
                    self.retry_max_delay_ms,
                );
                log::debug!("🔁 剪贴板写入重试 {}/{}，等待 {}ms", attempt, attempts, wait_ms);
                thread::sleep(Duration::from_millis(wait_ms));
            }

            match Self::write_once(&payload) {
                Ok(()) => {
                    log::info!("📋 已写入系统剪贴板（第 {} 次尝试）", attempt);
                    return Ok(());
                }
                Err(failure) => {
                    log::warn!(
                        "⚠️ 剪贴板写入失败（{:?}，第 {}/{} 次）：{}",
                        failure.kind,
                        attempt,
                        attempts,
                        failure.message
                    );
                    let retryable = failure.is_retryable();
                    last_error = Some(failure.message);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(SinkError(last_error.unwrap_or_default()))
    }
}

static JITTER_STATE: AtomicU64 = AtomicU64::new(0);

fn next_jitter_u64() -> u64 {
    let mut current = JITTER_STATE.load(Ordering::Relaxed);
    loop {
        let seeded = if current == 0 {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
                ^ 0x9E37_79B9_7F4A_7C15
        } else {
            current
        };

        let mut next = seeded;
        next ^= next << 13;
        next ^= next >> 7;
        next ^= next << 17;

        match JITTER_STATE.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => current = observed,
        }
    }
}

/// 第 n 次重试的等待：`base · 2^(n-1)`，封顶后再加至多 1/3 的抖动。
fn compute_backoff_delay_with_jitter(base_delay_ms: u64, retry: u32, max_delay_ms: u64) -> u64 {
    let exp = base_delay_ms.saturating_mul(1_u64 << retry.saturating_sub(1).min(8));
    let capped = exp.min(max_delay_ms.max(base_delay_ms));
    let jitter_bound = (capped / 3).max(1);
    capped.saturating_add(next_jitter_u64() % (jitter_bound + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_handler::pipeline::tests::png_bytes;

    #[test]
    fn backoff_grows_and_stays_bounded() {
        for _ in 0..32 {
            let first = compute_backoff_delay_with_jitter(100, 1, 900);
            assert!((100..=133).contains(&first));

            let capped = compute_backoff_delay_with_jitter(100, 8, 900);
            assert!((900..=1200).contains(&capped));
        }
    }

    #[test]
    fn occupied_clipboard_is_retryable() {
        let busy = ClipboardWriteFailure::from(arboard::Error::ClipboardOccupied);
        assert!(busy.is_retryable());

        let unsupported = ClipboardWriteFailure::from(arboard::Error::ClipboardNotSupported);
        assert!(!unsupported.is_retryable());
    }

    #[test]
    fn image_entry_is_decoded_before_writing() {
        let entries = [
            ClipboardEntry::new("text/plain", "hello"),
            ClipboardEntry::new("image/png", png_bytes(3, 2, [1, 2, 3, 255])),
        ];
        match prepare_payload(&entries).unwrap() {
            Payload::Image { width, height, rgba } => {
                assert_eq!((width, height), (3, 2));
                assert_eq!(rgba.len(), 3 * 2 * 4);
            }
            Payload::Text(_) => panic!("image entry should win"),
        }
    }

    #[test]
    fn empty_entries_are_rejected() {
        assert!(prepare_payload(&[]).is_err());
    }
}
