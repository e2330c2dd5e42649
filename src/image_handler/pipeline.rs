//! # 解码与变换流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 ↔ Data URL ↔ 图像”的转换集中管理，并在关键节点增加资源上限控制。
//! 优先做尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. Data URL 编解码（`data:<mime>;base64,<payload>`）
//! 2. 读取 header 尺寸并按像素上限快速拒绝
//! 3. 完整解码
//! 4. 缩放优先使用 `fast_image_resize`，失败时回退 `image::imageops`

use base64::{Engine as _, engine::general_purpose};
use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageReader, Rgba, RgbaImage};
use std::io::Cursor;

use super::ImageError;

/// 将字节编码为 Data URL。
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    let encoded = general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime, encoded)
}

/// 解析 Data URL，返回 `(mime, bytes)`。
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), ImageError> {
    let normalized = url.trim();
    let rest = normalized
        .strip_prefix("data:")
        .ok_or_else(|| ImageError::InvalidFormat("缺少 data: 前缀".to_string()))?;

    let marker = rest
        .find(";base64,")
        .ok_or_else(|| ImageError::InvalidFormat("缺少 base64 标记".to_string()))?;

    let mime = rest[..marker].to_string();
    let payload = &rest[marker + ";base64,".len()..];

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ImageError::Decode(format!("Base64 解码失败：{}", e)))?;

    Ok((mime, bytes))
}

/// 仅通过内存中的图片头信息读取宽高。
pub(crate) fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| ImageError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

/// 校验像素数量是否超过上限。
pub(crate) fn validate_pixel_limits(
    width: u32,
    height: u32,
    max_pixels: u64,
) -> Result<(), ImageError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| ImageError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels == 0 {
        return Err(ImageError::Decode("图片尺寸为零".to_string()));
    }

    if pixels > max_pixels {
        return Err(ImageError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, max_pixels
        )));
    }

    Ok(())
}

/// 先查 header 尺寸，再完整解码。
pub(crate) fn decode_with_limits(bytes: &[u8], max_pixels: u64) -> Result<DynamicImage, ImageError> {
    let (header_width, header_height) = inspect_dimensions_from_memory(bytes)?;
    validate_pixel_limits(header_width, header_height, max_pixels)?;

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ImageError::Decode(format!("图片解码失败：{}", e)))?;

    let (width, height) = decoded.dimensions();
    validate_pixel_limits(width, height, max_pixels)?;

    Ok(decoded)
}

/// 缩放到精确尺寸。
pub(crate) fn resize_exact(
    image: &RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == target_width && height == target_height {
        return image.clone();
    }

    match resize_with_fast_image_resize(image, target_width, target_height, filter) {
        Ok(resized) => resized,
        Err(err) => {
            log::warn!(
                "⚠️ fast_image_resize 缩放失败，回退 image::imageops::resize：{}",
                err
            );
            image::imageops::resize(image, target_width, target_height, filter)
        }
    }
}

fn resize_with_fast_image_resize(
    image: &RgbaImage,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, ImageError> {
    let (src_width, src_height) = image.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        image.as_raw().clone(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| ImageError::Decode(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)));

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ImageError::Decode(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| ImageError::Decode("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}
