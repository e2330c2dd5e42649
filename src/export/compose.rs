//! # CPU 合成
//!
//! 合成顺序固定：
//! 1. 按像素倍率放大源图
//! 2. 四周补 `inset` 像素的边缘色，得到卡片
//! 3. 卡片四角按 `border_radius` 做抗锯齿圆角
//! 4. 画布 = 卡片 + 两侧 `padding`，先铺背景（渐变或图片铺满裁切），再居中叠放卡片
//! 5. 需要底色时（JPG）把整张画布压到不透明底色上

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::{Frame, RenderError};
use crate::gradients::{LinearGradient, parse_linear_gradient};
use crate::image_handler::pipeline::{self, decode_data_url};
use crate::state::{BackgroundConfig, BackgroundKind};

/// 背景图片允许的最大像素数。
const MAX_BACKGROUND_PIXELS: u64 = 40_000_000;

pub(crate) fn compose(
    frame: &Frame,
    pixel_ratio: f32,
    backing: Option<Rgba<u8>>,
    max_output_pixels: u64,
) -> Result<RgbaImage, RenderError> {
    if !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
        return Err(RenderError(format!("像素倍率无效：{}", pixel_ratio)));
    }

    let scale = |v: u32| (v as f32 * pixel_ratio).round() as u32;
    let (src_w, src_h) = frame.source.dimensions();
    let content_w = scale(src_w).max(1);
    let content_h = scale(src_h).max(1);
    let inset = scale(frame.inset);
    let padding = scale(frame.padding);

    let too_large = |w: u64, h: u64| {
        RenderError(format!("输出尺寸过大：{}x{}（限制：{} 像素）", w, h, max_output_pixels))
    };
    let (card_w, canvas_w) = padded_length(content_w, inset, padding);
    let (card_h, canvas_h) = padded_length(content_h, inset, padding);
    let pixels = canvas_w.saturating_mul(canvas_h);
    if pixels > max_output_pixels {
        return Err(too_large(canvas_w, canvas_h));
    }

    // 上面的像素上限可能放行超过 u32 的单边长度
    let (Ok(card_w), Ok(card_h), Ok(canvas_w), Ok(canvas_h)) = (
        u32::try_from(card_w),
        u32::try_from(card_h),
        u32::try_from(canvas_w),
        u32::try_from(canvas_h),
    ) else {
        return Err(too_large(canvas_w, canvas_h));
    };

    let content = pipeline::resize_exact(&frame.source, content_w, content_h, FilterType::CatmullRom);

    let mut card = if inset > 0 {
        let edge = *frame.source.get_pixel(0, 0);
        let mut card = RgbaImage::from_pixel(card_w, card_h, edge);
        imageops::replace(&mut card, &content, inset as i64, inset as i64);
        card
    } else {
        content
    };

    round_corners(&mut card, scale(frame.border_radius) as f32);

    let mut canvas = paint_background(&frame.background, canvas_w, canvas_h);
    imageops::overlay(&mut canvas, &card, padding as i64, padding as i64);

    if let Some(color) = backing {
        let mut flat = RgbaImage::from_pixel(canvas_w, canvas_h, Rgba([color[0], color[1], color[2], 255]));
        imageops::overlay(&mut flat, &canvas, 0, 0);
        canvas = flat;
    }

    Ok(canvas)
}

/// 单边长度：卡片 = 内容 + 两侧 `inset`，画布 = 卡片 + 两侧 `padding`。
/// 在 u64 中计算，三个 u32 相加不会溢出。
fn padded_length(content: u32, inset: u32, padding: u32) -> (u64, u64) {
    let card = u64::from(content) + 2 * u64::from(inset);
    (card, card + 2 * u64::from(padding))
}

/// 四角圆角：按覆盖率缩放 alpha（半像素抗锯齿）。
pub(crate) fn round_corners(image: &mut RgbaImage, radius: f32) {
    let (width, height) = image.dimensions();
    let radius = radius.min(width as f32 / 2.0).min(height as f32 / 2.0);
    if radius <= 0.0 {
        return;
    }

    let span = radius.ceil() as u32;
    for y in 0..span.min(height) {
        for x in 0..span.min(width) {
            let cx = radius;
            let cy = radius;
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            let distance = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
            if px >= cx || py >= cy {
                continue;
            }
            let coverage = (radius - distance + 0.5).clamp(0.0, 1.0);
            if coverage >= 1.0 {
                continue;
            }

            for (tx, ty) in [
                (x, y),
                (width - 1 - x, y),
                (x, height - 1 - y),
                (width - 1 - x, height - 1 - y),
            ] {
                let pixel = image.get_pixel_mut(tx, ty);
                pixel[3] = (pixel[3] as f32 * coverage).round() as u8;
            }
        }
    }
}

fn paint_background(background: &BackgroundConfig, width: u32, height: u32) -> RgbaImage {
    match background.kind {
        BackgroundKind::Gradient => match parse_linear_gradient(&background.value) {
            Ok(gradient) => fill_linear_gradient(&gradient, width, height),
            Err(err) => {
                log::warn!("⚠️ {}，使用纯色背景", err);
                RgbaImage::from_pixel(width, height, LinearGradient::fallback_color(&background.value))
            }
        },
        BackgroundKind::Image => match load_background_image(&background.value) {
            Ok(image) => cover(&image, width, height),
            Err(err) => {
                log::warn!("⚠️ 背景图片不可用，使用透明背景：{}", err);
                RgbaImage::new(width, height)
            }
        },
    }
}

/// 按 CSS 规则填充线性渐变：渐变线过中心，长度 = |w·sinθ| + |h·cosθ|。
pub(crate) fn fill_linear_gradient(gradient: &LinearGradient, width: u32, height: u32) -> RgbaImage {
    let theta = gradient.angle_deg.to_radians();
    let (dx, dy) = (theta.sin(), -theta.cos());
    let (w, h) = (width as f32, height as f32);
    let length = (w * dx).abs() + (h * dy).abs();

    RgbaImage::from_fn(width, height, |x, y| {
        if length <= f32::EPSILON {
            return gradient.sample(0.5);
        }
        let px = x as f32 + 0.5 - w / 2.0;
        let py = y as f32 + 0.5 - h / 2.0;
        gradient.sample((px * dx + py * dy) / length + 0.5)
    })
}

fn load_background_image(value: &str) -> Result<RgbaImage, RenderError> {
    let bytes = if value.trim_start().starts_with("data:") {
        decode_data_url(value)
            .map(|(_, bytes)| bytes)
            .map_err(|e| RenderError(e.to_string()))?
    } else {
        std::fs::read(value).map_err(|e| RenderError(format!("无法读取背景图片 '{}': {}", value, e)))?
    };

    pipeline::decode_with_limits(&bytes, MAX_BACKGROUND_PIXELS)
        .map(|image| image.to_rgba8())
        .map_err(|e| RenderError(e.to_string()))
}

/// 等比放大到完全覆盖目标尺寸，再居中裁切。
fn cover(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (iw, ih) = image.dimensions();
    let scale = (width as f32 / iw as f32).max(height as f32 / ih as f32);
    let scaled_w = ((iw as f32 * scale).ceil() as u32).max(width);
    let scaled_h = ((ih as f32 * scale).ceil() as u32).max(height);

    let scaled = pipeline::resize_exact(image, scaled_w, scaled_h, FilterType::Triangle);
    let x = (scaled_w - width) / 2;
    let y = (scaled_h - height) / 2;
    imageops::crop_imm(&scaled, x, y, width, height).to_image()
}
