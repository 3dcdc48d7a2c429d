use ndarray::Array2;

use super::{DecodeError, PixelGrid};

/// Keeps the rescale finite when every pixel has the same value.
pub const RANGE_EPSILON: f64 = 1e-8;

/// 8-bit grayscale grid, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub bits_allocated: u16,
}

fn intensity_range(samples: &Array2<f64>) -> Option<(f64, f64)> {
    samples
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}

pub fn normalize_grid(grid: &PixelGrid) -> Result<NormalizedImage, DecodeError> {
    if grid.samples.is_empty() {
        return Err(DecodeError::EmptyGrid);
    }

    // A grid with no finite sample renders black.
    let (min, max) = intensity_range(&grid.samples).unwrap_or((0.0, 0.0));
    let denominator = max - min + RANGE_EPSILON;

    let pixels = grid
        .samples
        .iter()
        .map(|&v| {
            let scaled = (255.0 * (v - min) / denominator).round();
            // NaN saturates to 0
            scaled.clamp(0.0, 255.0) as u8
        })
        .collect();

    Ok(NormalizedImage {
        width: grid.width(),
        height: grid.height(),
        pixels,
        bits_allocated: grid.bits_allocated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn grid(samples: Array2<f64>) -> PixelGrid {
        PixelGrid::new(samples, 16)
    }

    #[test]
    fn stretches_range_to_full_byte() {
        let image = normalize_grid(&grid(array![[100.0, 150.0], [200.0, 300.0]])).unwrap();
        assert_eq!(image.width, 2);
        assert_eq!(image.height, 2);
        // 127.5 sits just under the midpoint once epsilon is added
        assert_eq!(image.pixels, vec![0, 64, 127, 255]);
    }

    #[test]
    fn min_maps_to_zero_and_max_to_255_for_wide_ranges() {
        let image =
            normalize_grid(&grid(array![[-1024.0, 0.0, 3071.0], [12.5, 2000.0, -3.0]])).unwrap();
        assert_eq!(image.pixels[0], 0);
        assert_eq!(image.pixels[2], 255);
        assert_eq!(image.pixels[5], 64);
    }

    #[test]
    fn unit_range_reaches_both_ends() {
        let image = normalize_grid(&grid(array![[5.0, 6.0]])).unwrap();
        assert_eq!(image.pixels, vec![0, 255]);
    }

    #[test]
    fn flat_image_maps_to_zero() {
        let image = normalize_grid(&grid(Array2::from_elem((3, 4), 812.0))).unwrap();
        assert_eq!(image.pixels, vec![0; 12]);
    }

    #[test]
    fn single_pixel_maps_to_zero() {
        let image = normalize_grid(&grid(array![[42.0]])).unwrap();
        assert_eq!(image.width, 1);
        assert_eq!(image.height, 1);
        assert_eq!(image.pixels, vec![0]);
    }

    #[test]
    fn non_finite_samples_do_not_poison_the_range() {
        let image = normalize_grid(&grid(array![[0.0, f64::NAN, 10.0]])).unwrap();
        assert_eq!(image.pixels, vec![0, 0, 255]);
    }

    #[test]
    fn empty_grid_is_an_error() {
        let err = normalize_grid(&grid(Array2::zeros((0, 0)))).unwrap_err();
        assert!(matches!(err, DecodeError::EmptyGrid));
    }

    #[test]
    fn decodes_and_normalizes_a_dicom_file() {
        let raw = crate::imaging::dicom_reader::fixtures::monochrome16(1, 3, &[10, 20, 30]);
        let image = crate::imaging::normalize(&raw).unwrap();
        assert_eq!((image.width, image.height), (3, 1));
        assert_eq!(image.pixels, vec![0, 127, 255]);
    }

    #[test]
    fn stretches_adjacent_32_bit_values() {
        let raw = crate::imaging::dicom_reader::fixtures::monochrome32(1, 2, &[100_000_000, 100_000_001]);
        let image = crate::imaging::normalize(&raw).unwrap();
        assert_eq!(image.bits_allocated, 32);
        assert_eq!(image.pixels, vec![0, 255]);
    }
}
