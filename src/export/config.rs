//! # 导出配置
//!
//! `Default` 即产品行为：2 倍像素密度输出，JPG 默认质量 0.95 并铺白色底，
//! 剪贴板写入遇到占用时有限重试。

use image::Rgba;

#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// 光栅化像素倍率（高分屏 2x）。
    pub pixel_ratio: f32,
    /// 未指定质量时 JPG 使用的质量（0..=1）。
    pub default_jpeg_quality: f32,
    /// JPG 没有 alpha 通道，透明区域先铺此底色。
    pub jpeg_backing: Rgba<u8>,
    /// 分享面板标题。
    pub share_title: String,
    /// 分享附带文案。
    pub share_text: String,
    /// 剪贴板写入被占用时的最大重试次数。
    pub clipboard_retries: u32,
    /// 首次重试间隔（毫秒），之后指数退避。
    pub clipboard_retry_delay_ms: u64,
    /// 单次退避延迟上限（毫秒）。
    pub clipboard_retry_max_delay_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 2.0,
            default_jpeg_quality: 0.95,
            jpeg_backing: Rgba([255, 255, 255, 255]),
            share_title: "XXXnaper Screenshot".to_string(),
            share_text: "Beautiful screenshot created with XXXnaper".to_string(),
            clipboard_retries: 3,
            clipboard_retry_delay_ms: 100,
            clipboard_retry_max_delay_ms: 900,
        }
    }
}
