use image::imageops::FilterType;

/// Longest edge of a decoded preview.
pub const PREVIEW_MAX_DIMENSION: u32 = 480;

/// Straight-alpha RGBA pixels ready to be uploaded as a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub fn decode_preview(bytes: &[u8]) -> Result<PreviewImage, image::ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let (orig_w, orig_h) = (decoded.width(), decoded.height());
    let scale = (PREVIEW_MAX_DIMENSION as f32 / orig_w.max(orig_h).max(1) as f32).min(1.0);
    let resized = if scale < 1.0 {
        decoded.resize(
            (orig_w as f32 * scale).max(1.0) as u32,
            (orig_h as f32 * scale).max(1.0) as u32,
            FilterType::Triangle,
        )
    } else {
        decoded
    };
    let rgba = resized.to_rgba8();
    Ok(PreviewImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
pub(crate) fn encode_test_png(width: u32, height: u32) -> Vec<u8> {
    use std::io::Cursor;

    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([40, 160, 60, 255]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .expect("encode png");
    out
}
