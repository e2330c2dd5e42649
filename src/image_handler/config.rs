//! # 加载配置模块
//!
//! 将加载阶段的可调策略集中到 `LoaderConfig`。`Default` 即产品策略：
//! 仅允许 PNG / JPEG / WEBP / GIF，单文件不超过 10 MB。

/// 默认允许的 MIME 类型（`image/jpg` 为部分平台的非标准写法，一并接受）。
pub const ALLOWED_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "image/gif",
];

/// 默认单文件体积上限：10 MB。
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// 默认解码像素上限：16384 x 16384（RGBA 约 1 GiB），与常见浏览器画布面积上限一致。
/// 高压缩率的 10 MB 文件可以声明远超四千万像素的尺寸，仍应能正常加载。
pub const MAX_DECODED_PIXELS: u64 = 1 << 28;

/// 图片加载配置。
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// 允许的声明 MIME 类型（精确匹配）。
    pub allowed_types: Vec<String>,
    /// 允许的最大文件体积（字节，含等于）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`），超出视为解码失败。
    /// 只用于挡住无法在内存中展开的图片。
    pub max_decoded_pixels: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            allowed_types: ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
            max_file_size: MAX_FILE_SIZE,
            max_decoded_pixels: MAX_DECODED_PIXELS,
        }
    }
}

impl LoaderConfig {
    pub fn is_allowed_type(&self, mime: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime)
    }

    /// 体积上限的展示文本，如 `10MB`。
    pub(crate) fn max_file_size_label(&self) -> String {
        let mb = self.max_file_size as f64 / 1024.0 / 1024.0;
        if mb.fract() == 0.0 {
            format!("{}MB", mb as u64)
        } else {
            format!("{:.1}MB", mb)
        }
    }
}
