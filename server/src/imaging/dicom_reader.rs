use dicom_core::Tag;
use dicom_dictionary_std::tags;
use dicom_object::{InMemDicomObject, mem::InMemElement};
use dicom_pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder};
use ndarray::Array2;

use super::DecodeError;

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// Integer pixel data lives in (7FE0,0010); float and double float images
/// use their own tags.
const PIXEL_DATA_TAGS: [Tag; 3] = [
    tags::PIXEL_DATA,
    tags::FLOAT_PIXEL_DATA,
    tags::DOUBLE_FLOAT_PIXEL_DATA,
];

/// Raw intensities of the first frame, one value per pixel.
#[derive(Debug, Clone)]
pub struct PixelGrid {
    pub samples: Array2<f64>,
    pub bits_allocated: u16,
}

impl PixelGrid {
    pub fn new(samples: Array2<f64>, bits_allocated: u16) -> Self {
        Self {
            samples,
            bits_allocated,
        }
    }

    pub fn width(&self) -> u32 {
        self.samples.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.samples.nrows() as u32
    }
}

/// Image pixel module attributes needed to lay out the first frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PixelLayout {
    rows: usize,
    columns: usize,
    samples_per_pixel: usize,
    bits_allocated: u16,
    bits_stored: u16,
    signed: bool,
    planar: bool,
    frames: u32,
}

impl PixelLayout {
    fn read(object: &InMemDicomObject, pixel_tag: Tag) -> Result<Self, DecodeError> {
        let rows = required_u16(object, tags::ROWS, "Rows")?;
        let columns = required_u16(object, tags::COLUMNS, "Columns")?;
        let bits_allocated = if pixel_tag == tags::PIXEL_DATA {
            required_u16(object, tags::BITS_ALLOCATED, "BitsAllocated")?
        } else {
            let default = if pixel_tag == tags::DOUBLE_FLOAT_PIXEL_DATA { 64 } else { 32 };
            optional_u16(object, tags::BITS_ALLOCATED).unwrap_or(default)
        };
        let bits_stored = optional_u16(object, tags::BITS_STORED)
            .unwrap_or(bits_allocated)
            .clamp(1, bits_allocated.max(1));

        Ok(Self {
            rows: usize::from(rows),
            columns: usize::from(columns),
            samples_per_pixel: usize::from(
                optional_u16(object, tags::SAMPLES_PER_PIXEL).unwrap_or(1).max(1),
            ),
            bits_allocated,
            bits_stored,
            signed: optional_u16(object, tags::PIXEL_REPRESENTATION) == Some(1),
            planar: optional_u16(object, tags::PLANAR_CONFIGURATION) == Some(1),
            frames: object
                .element(tags::NUMBER_OF_FRAMES)
                .ok()
                .and_then(|e| e.to_int::<u32>().ok())
                .unwrap_or(1),
        })
    }

    fn frame_len(&self) -> usize {
        self.rows * self.columns * self.samples_per_pixel
    }
}

fn optional_u16(object: &InMemDicomObject, tag: Tag) -> Option<u16> {
    object.element(tag).ok()?.to_int::<u16>().ok()
}

fn required_u16(object: &InMemDicomObject, tag: Tag, name: &str) -> Result<u16, DecodeError> {
    optional_u16(object, tag)
        .ok_or_else(|| DecodeError::PixelData(format!("missing or invalid {}", name)))
}

/// Files written to disk carry a 128-byte preamble before the magic code,
/// network payloads often do not.
fn strip_preamble(raw: &[u8]) -> Result<&[u8], DecodeError> {
    if raw.len() >= PREAMBLE_LEN + MAGIC.len() && &raw[PREAMBLE_LEN..PREAMBLE_LEN + MAGIC.len()] == MAGIC {
        Ok(&raw[PREAMBLE_LEN..])
    } else if raw.starts_with(MAGIC) {
        Ok(raw)
    } else {
        Err(DecodeError::InvalidContainer(
            "missing DICM magic code".to_string(),
        ))
    }
}

fn pixel_element(object: &InMemDicomObject) -> Option<(Tag, &InMemElement)> {
    PIXEL_DATA_TAGS
        .iter()
        .find_map(|&tag| object.element(tag).ok().map(|element| (tag, element)))
}

/// Sign-extends or masks a raw sample down to its stored bits.
fn stored_value(raw: u64, bits_stored: u16, signed: bool) -> f64 {
    if bits_stored >= 64 {
        return if signed { raw as i64 as f64 } else { raw as f64 };
    }
    let value = raw & ((1_u64 << bits_stored) - 1);
    if signed && value & (1_u64 << (bits_stored - 1)) != 0 {
        (value as i64 - (1_i64 << bits_stored)) as f64
    } else {
        value as f64
    }
}

/// Little-endian integer samples of any whole-byte depth.
fn integer_samples(bytes: &[u8], layout: &PixelLayout) -> Result<Vec<f64>, DecodeError> {
    let width = match layout.bits_allocated {
        8 | 16 | 32 | 64 => usize::from(layout.bits_allocated / 8),
        other => {
            return Err(DecodeError::PixelData(format!(
                "unsupported BitsAllocated {}",
                other
            )));
        }
    };
    Ok(bytes
        .chunks_exact(width)
        .map(|chunk| {
            let raw = chunk
                .iter()
                .rev()
                .fold(0_u64, |acc, &byte| (acc << 8) | u64::from(byte));
            stored_value(raw, layout.bits_stored, layout.signed)
        })
        .collect())
}

fn float_samples(bytes: &[u8], pixel_tag: Tag) -> Vec<f64> {
    if pixel_tag == tags::DOUBLE_FLOAT_PIXEL_DATA {
        bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut raw = [0_u8; 8];
                raw.copy_from_slice(chunk);
                f64::from_le_bytes(raw)
            })
            .collect()
    } else {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let mut raw = [0_u8; 4];
                raw.copy_from_slice(chunk);
                f64::from(f32::from_le_bytes(raw))
            })
            .collect()
    }
}

/// Encapsulated (compressed) and bit-packed data go through the codecs.
fn codec_samples(object: &dicom_object::DefaultDicomObject) -> Result<Vec<f64>, DecodeError> {
    let decoded = object
        .decode_pixel_data()
        .map_err(|e| DecodeError::PixelData(e.to_string()))?;
    // Stored values, no rescale slope/intercept.
    let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
    let values: Vec<f32> = decoded
        .to_vec_with_options(&options)
        .map_err(|e| DecodeError::PixelData(e.to_string()))?;
    Ok(values.into_iter().map(f64::from).collect())
}

/// Mean over the samples of each pixel. Planar data stores one full plane
/// per sample, interleaved data keeps a pixel's samples together.
fn collapse_samples(frame: &[f64], samples_per_pixel: usize, planar: bool) -> Vec<f64> {
    if samples_per_pixel <= 1 {
        return frame.to_vec();
    }
    let count = samples_per_pixel as f64;
    if planar {
        let plane_len = frame.len() / samples_per_pixel;
        (0..plane_len)
            .map(|i| {
                (0..samples_per_pixel)
                    .map(|plane| frame[plane * plane_len + i])
                    .sum::<f64>()
                    / count
            })
            .collect()
    } else {
        frame
            .chunks_exact(samples_per_pixel)
            .map(|pixel| pixel.iter().sum::<f64>() / count)
            .collect()
    }
}

pub fn decode_pixel_grid(raw: &[u8]) -> Result<PixelGrid, DecodeError> {
    let body = strip_preamble(raw)?;
    let object = dicom_object::from_reader(body)
        .map_err(|e| DecodeError::InvalidContainer(e.to_string()))?;

    let (pixel_tag, element) = pixel_element(&object).ok_or(DecodeError::MissingPixelData)?;
    let layout = PixelLayout::read(&object, pixel_tag)?;
    let frame_len = layout.frame_len();
    if frame_len == 0 {
        return Err(DecodeError::EmptyGrid);
    }

    // Native data is read straight from the element so that 32-bit and
    // float depths keep their full precision.
    let values = match element.value().primitive() {
        Some(value) if pixel_tag != tags::PIXEL_DATA => float_samples(&value.to_bytes(), pixel_tag),
        Some(value) if layout.bits_allocated >= 8 => integer_samples(&value.to_bytes(), &layout)?,
        _ => codec_samples(&object)?,
    };
    if values.len() < frame_len {
        return Err(DecodeError::PixelData(format!(
            "expected {} samples, found {}",
            frame_len,
            values.len()
        )));
    }

    // First frame only.
    let intensities = collapse_samples(&values[..frame_len], layout.samples_per_pixel, layout.planar);
    let samples = Array2::from_shape_vec((layout.rows, layout.columns), intensities)
        .map_err(|e| DecodeError::PixelData(e.to_string()))?;

    log::debug!(
        "Decoded {}x{} pixel grid ({} bits allocated, {} frame(s))",
        layout.columns,
        layout.rows,
        layout.bits_allocated,
        layout.frames
    );

    Ok(PixelGrid::new(samples, layout.bits_allocated))
}
