use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{GrayImage, ImageFormat};
use shared::PreviewImage;
use std::io::Cursor;

use super::{DecodeError, NormalizedImage};

pub fn encode_png(image: &NormalizedImage) -> Result<Vec<u8>, DecodeError> {
    let gray = GrayImage::from_raw(image.width, image.height, image.pixels.clone()).ok_or_else(
        || {
            DecodeError::Encoding(format!(
                "{} pixels do not fill a {}x{} image",
                image.pixels.len(),
                image.width,
                image.height
            ))
        },
    )?;

    let mut png = Cursor::new(Vec::new());
    gray.write_to(&mut png, ImageFormat::Png)
        .map_err(|e| DecodeError::Encoding(e.to_string()))?;
    Ok(png.into_inner())
}

/// Embeds the normalized image as a `data:` URL the browser can show directly.
pub fn render_preview(image: &NormalizedImage) -> Result<PreviewImage, DecodeError> {
    let png = encode_png(image)?;
    Ok(PreviewImage {
        data_url: format!("data:image/png;base64,{}", STANDARD.encode(png)),
        width: image.width,
        height: image.height,
        bits_allocated: image.bits_allocated,
    })
}
