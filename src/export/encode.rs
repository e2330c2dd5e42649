use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, RgbaImage};

use super::{Blob, ExportFormat, RenderError};

/// 将合成后的画布编码为目标格式。JPG 丢弃 alpha，调用方应先铺底色。
pub(crate) fn encode(canvas: RgbaImage, format: ExportFormat, quality: f32) -> Result<Blob, RenderError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        ExportFormat::Png => {
            DynamicImage::ImageRgba8(canvas)
                .write_with_encoder(PngEncoder::new(&mut buf))
                .map_err(|e| RenderError(format!("PNG 编码失败：{}", e)))?;
        }
        ExportFormat::Jpg => {
            let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
            DynamicImage::ImageRgb8(rgb)
                .write_with_encoder(encoder)
                .map_err(|e| RenderError(format!("JPG 编码失败：{}", e)))?;
        }
    }

    Ok(Blob {
        mime: format.mime(),
        bytes: Bytes::from(buf.into_inner()),
    })
}

/// 0..=1 映射为 JPEG 编码器的 1..=100。
fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}
