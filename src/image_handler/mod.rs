//! # 图片加载模块（image_handler）
//!
//! ## 设计思路
//!
//! 将“候选文件 → 校验 → 读取为 Data URL → 解码取尺寸”按职责拆分为多个子模块。
//! 每次用户操作最多调用一次加载，不做并发控制、不做重试，由调用方决定是否重新触发。
//!
//! - `config`：加载策略（允许类型、体积与像素上限）
//! - `error`：加载链路与解码流水线的错误模型
//! - `source`：候选文件、剪贴板条目与加载结果
//! - `loader`：编排整条加载流程
//! - `pipeline`：Data URL 编解码、尺寸探测、完整解码与缩放
//!
//! ## 调用链
//!
//! ```text
//! input（上传 / 粘贴 / 拖放）
//!    ↓
//! loader.rs（校验 → 读取 → 解码）
//!    ├─ validation.rs（类型 + 体积）
//!    └─ pipeline.rs（Data URL + 尺寸 + 像素限制）
//!    ↓
//! Result<LoadedImage, LoadError>
//! ```

mod config;
mod error;
mod loader;
pub(crate) mod pipeline;
mod source;

pub use config::{LoaderConfig, MAX_DECODED_PIXELS, MAX_FILE_SIZE};
pub use error::{ImageError, LoadError};
pub use loader::{ImageLoader, load_image_file};
pub use pipeline::{decode_data_url, encode_data_url};
pub use source::{CandidateFile, ClipboardItem, LoadedImage};
