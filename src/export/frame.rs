use std::sync::Arc;

use image::RgbaImage;

use super::ExportError;
use crate::image_handler::LoaderConfig;
use crate::image_handler::pipeline::{decode_with_limits, decode_data_url};
use crate::state::{AppSettings, BackgroundConfig, ImageDescriptor};

/// 待光栅化的场景：源图 + 样式快照。克隆只复制引用。
#[derive(Debug, Clone)]
pub struct Frame {
    pub source: Arc<RgbaImage>,
    pub padding: u32,
    pub inset: u32,
    pub border_radius: u32,
    pub background: BackgroundConfig,
}

impl Frame {
    pub fn new(source: RgbaImage, settings: &AppSettings) -> Self {
        Self {
            source: Arc::new(source),
            padding: settings.padding,
            inset: settings.inset,
            border_radius: settings.border_radius,
            background: settings.background.clone(),
        }
    }

    /// 由当前图片状态与设置构造；没有图片时返回 `NoImage`。
    pub fn from_state(
        image: &ImageDescriptor,
        settings: &AppSettings,
        config: &LoaderConfig,
    ) -> Result<Self, ExportError> {
        let url = image.url.as_deref().ok_or(ExportError::NoImage)?;
        let (_, bytes) = decode_data_url(url).map_err(|e| ExportError::render(e.to_string()))?;
        let decoded = decode_with_limits(&bytes, config.max_decoded_pixels)
            .map_err(|e| ExportError::render(e.to_string()))?;

        Ok(Self::new(decoded.to_rgba8(), settings))
    }

    /// 1x 逻辑尺寸：源图 + 两侧内边距 + 两侧留白（u64，不会溢出）。
    pub fn logical_size(&self) -> (u64, u64) {
        let extra = 2 * (u64::from(self.inset) + u64::from(self.padding));
        (
            u64::from(self.source.width()) + extra,
            u64::from(self.source.height()) + extra,
        )
    }
}
