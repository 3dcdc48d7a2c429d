pub mod dicom_reader;
pub mod normalize;
pub mod preview;

pub use dicom_reader::{PixelGrid, decode_pixel_grid};
pub use normalize::{NormalizedImage, normalize_grid};
pub use preview::render_preview;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Not a readable DICOM file: {0}")]
    InvalidContainer(String),
    #[error("DICOM file has no pixel data")]
    MissingPixelData,
    #[error("Failed to decode pixel data: {0}")]
    PixelData(String),
    #[error("Pixel data is empty")]
    EmptyGrid,
    #[error("Failed to encode preview: {0}")]
    Encoding(String),
}

/// Full decode + rescale of an uploaded file.
pub fn normalize(raw: &[u8]) -> Result<NormalizedImage, DecodeError> {
    let grid = decode_pixel_grid(raw)?;
    normalize_grid(&grid)
}
