//! # 导出模块（export）
//!
//! ## 设计思路
//!
//! 导出链路把一个 `Frame`（源图 + 样式快照）光栅化后送往不同出口：
//! Data URL、二进制 Blob、下载目录中的文件、系统剪贴板、平台分享。
//! 光栅化器与各出口都是注入的 trait 对象，便于测试替换与平台扩展。
//!
//! - `config`：导出策略（像素倍率、JPG 默认质量与底色、分享文案、剪贴板重试）
//! - `error`：导出错误模型
//! - `options`：导出格式与质量、Blob
//! - `frame`：待光栅化的场景
//! - `compose` / `encode` / `render`：CPU 合成、编码与 `Rasterizer` 接口
//! - `clipboard_writer` / `download` / `share`：三个出口
//! - `exporter`：编排
//!
//! ## 调用链
//!
//! ```text
//! Exporter::{download_image, copy_to_clipboard, share_image}
//!    ↓
//! export_to_data_url / export_to_blob
//!    ↓
//! Rasterizer::rasterize（阻塞线程）
//!    ├─ compose.rs（背景 + 留白 + 内边距 + 圆角）
//!    └─ encode.rs（PNG 无损 / JPG 质量 + 白色底）
//!    ↓
//! DownloadSink / ClipboardSink / ShareTarget
//! ```

mod clipboard_writer;
mod compose;
mod config;
mod download;
mod encode;
mod error;
mod exporter;
mod frame;
mod options;
mod render;
mod share;

pub use clipboard_writer::{ClipboardEntry, ClipboardSink, SystemClipboard};
pub use config::ExportConfig;
pub use download::{DirectoryDownloads, DownloadSink};
pub use error::{ExportError, RenderError, SinkError};
pub use exporter::Exporter;
pub use frame::Frame;
pub use options::{Blob, ExportFormat, ExportOptions, timestamped_stem};
pub use render::{CpuRasterizer, RasterRequest, Rasterizer};
pub use share::{NoShareSupport, ShareData, ShareError, ShareFile, ShareTarget, SystemOpenShare};
