//! # 光栅化端口
//!
//! `Rasterizer` 把 `Frame` 渲染成指定格式的字节。默认实现 `CpuRasterizer`
//! 在当前线程完成合成与编码，调用方负责放入阻塞线程池。

use std::time::Instant;

use image::Rgba;

use super::{Blob, ExportFormat, Frame, RenderError, compose, encode};

/// 一次光栅化的参数。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterRequest {
    pub format: ExportFormat,
    /// 0..=1，仅 JPG 使用。
    pub quality: f32,
    pub pixel_ratio: f32,
    /// 不透明底色；`None` 时保留透明。
    pub backing: Option<Rgba<u8>>,
}

pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, frame: &Frame, request: &RasterRequest) -> Result<Blob, RenderError>;
}

/// 纯 CPU 实现。
#[derive(Debug, Clone)]
pub struct CpuRasterizer {
    max_output_pixels: u64,
}

impl CpuRasterizer {
    /// 与加载阶段的像素上限相同。
    pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = crate::image_handler::MAX_DECODED_PIXELS;

    pub fn new() -> Self {
        Self::with_max_output_pixels(Self::DEFAULT_MAX_OUTPUT_PIXELS)
    }

    pub fn with_max_output_pixels(max_output_pixels: u64) -> Self {
        Self { max_output_pixels }
    }
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for CpuRasterizer {
    fn rasterize(&self, frame: &Frame, request: &RasterRequest) -> Result<Blob, RenderError> {
        let started = Instant::now();
        let canvas = compose::compose(frame, request.pixel_ratio, request.backing, self.max_output_pixels)?;
        let (width, height) = canvas.dimensions();
        let compose_ms = started.elapsed().as_millis();

        let blob = encode::encode(canvas, request.format, request.quality)?;

        log::debug!(
            "🖼️ 光栅化完成 - {}x{} {} ({} 字节) 合成 {}ms / 总计 {}ms",
            width,
            height,
            request.format.extension(),
            blob.len(),
            compose_ms,
            started.elapsed().as_millis()
        );
        Ok(blob)
    }
}
