use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// 导出格式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpg,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpg),
            _ => None,
        }
    }

    /// 文件扩展名（同时用于下载 / 分享文件名）。
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpg => "image/jpeg",
        }
    }
}

/// 导出选项。`quality` 仅对 JPG 有意义，取值 0..=1。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub format: ExportFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f32>,
}

impl ExportOptions {
    pub fn png() -> Self {
        Self {
            format: ExportFormat::Png,
            quality: None,
        }
    }

    pub fn jpg(quality: Option<f32>) -> Self {
        Self {
            format: ExportFormat::Jpg,
            quality,
        }
    }

    /// 实际生效的编码质量：PNG 恒为 1；JPG 未指定（或为 0 / 非数）时取默认值，其余夹取到 0..=1。
    pub fn effective_quality(&self, default_jpeg_quality: f32) -> f32 {
        match self.format {
            ExportFormat::Png => 1.0,
            ExportFormat::Jpg => match self.quality {
                Some(q) if q.is_finite() && q > 0.0 => q.min(1.0),
                _ => default_jpeg_quality,
            },
        }
    }

    pub fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.format.extension())
    }
}

/// 默认文件名主干：`xxxnaper-20260101-093000`（本地时间）。
pub fn timestamped_stem() -> String {
    format!("xxxnaper-{}", chrono::Local::now().format("%Y%m%d-%H%M%S"))
}

/// 二进制导出结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime: &'static str,
    pub bytes: Bytes,
}

impl Blob {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
