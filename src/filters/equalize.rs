//! Histogram equalization for contrast enhancement.
//!
//! Colour images are equalized on the luma plane only: BGR is decomposed
//! into Y/U/V (see [`super::yuv`]), Y is remapped through its normalized
//! cumulative distribution, and U/V are carried over unchanged before the
//! conversion back to BGR. Grayscale images are equalized directly.
//!
//! ## Supported Formats
//!
//! - **Grayscale (1 plane)**: the plane itself is equalized
//! - **BGR (3 planes)**: luma equalized, chroma untouched
//!
//! Global equalization is not a projection: applying it twice may change
//! luma again, and small value ranges show the usual stair-stepping.

use std::str::FromStr;

use ndarray::ArrayView2;
use serde::Deserialize;

use super::yuv::LumaChroma;
use crate::error::{EnhanceError, Result};
use crate::histogram::{channel_histogram, Histogram, BINS};
use crate::plane::{ChannelPlane, ColorImage};

/// How the cumulative distribution is mapped onto 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CdfMapping {
    /// `round(255 * CDF(v) / N)`.
    #[default]
    Normalized,
    /// `round(255 * (CDF(v) - CDF_min) / (N - CDF_min))`, where `CDF_min` is
    /// the count of the darkest occupied level. A single-valued plane is left
    /// as is.
    MinShifted,
}

impl FromStr for CdfMapping {
    type Err = EnhanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normalized" => Ok(CdfMapping::Normalized),
            "min-shifted" => Ok(CdfMapping::MinShifted),
            other => Err(EnhanceError::Config(format!("unknown cdf mapping {other:?}"))),
        }
    }
}

/// Build the 256-entry remap table for a histogram.
pub fn equalization_lut(hist: &Histogram, mapping: CdfMapping) -> [u8; BINS] {
    let cdf = hist.cdf();
    let total = hist.total();
    let mut lut = [0u8; BINS];

    if total == 0 {
        return lut;
    }

    match mapping {
        CdfMapping::Normalized => {
            for (slot, &c) in lut.iter_mut().zip(cdf.iter()) {
                *slot = scale_to_u8(c as f64 * 255.0 / total as f64);
            }
        }
        CdfMapping::MinShifted => {
            let cdf_min = hist.bins().iter().copied().find(|&c| c > 0).unwrap_or(0);
            if cdf_min == total {
                for (v, slot) in lut.iter_mut().enumerate() {
                    *slot = v as u8;
                }
                return lut;
            }
            let denom = (total - cdf_min) as f64;
            for (slot, &c) in lut.iter_mut().zip(cdf.iter()) {
                *slot = scale_to_u8((c as f64 - cdf_min as f64) * 255.0 / denom);
            }
        }
    }

    lut
}

#[inline]
fn scale_to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Equalize a single plane.
pub fn equalize_plane(plane: ArrayView2<u8>, mapping: CdfMapping) -> ChannelPlane {
    let lut = equalization_lut(&channel_histogram(plane), mapping);
    plane.mapv(|v| lut[v as usize])
}

/// Equalize the luma plane in place, leaving chroma untouched.
pub fn equalize_luma(planes: &mut LumaChroma, mapping: CdfMapping) {
    planes.luma = equalize_plane(planes.luma.view(), mapping);
}

/// Apply histogram equalization to an image.
///
/// # Returns
/// Image with the same dimensions, channel count and channel order
pub fn histogram_equalization(image: &ColorImage, mapping: CdfMapping) -> Result<ColorImage> {
    if image.is_grayscale() {
        return ColorImage::gray(equalize_plane(image.planes()[0].view(), mapping));
    }

    let mut yuv = LumaChroma::from_bgr(image)?;
    equalize_luma(&mut yuv, mapping);
    yuv.to_bgr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::histograms;
    use ndarray::{array, Array2};

    fn ramp(height: usize, width: usize, lo: u8, hi: u8) -> Array2<u8> {
        let span = (hi - lo) as usize + 1;
        Array2::from_shape_fn((height, width), |(y, x)| lo + ((y * width + x) % span) as u8)
    }

    #[test]
    fn test_flat_gray_stays_single_spike() {
        let image = ColorImage::filled(10, 10, 3, 128).unwrap();

        let before = LumaChroma::from_bgr(&image).unwrap();
        let luma_before = channel_histogram(before.luma.view());
        assert_eq!(luma_before.count(128), 100);

        let result = histogram_equalization(&image, CdfMapping::Normalized).unwrap();
        let after = LumaChroma::from_bgr(&result).unwrap();
        let luma_after = channel_histogram(after.luma.view());
        assert_eq!(luma_after.occupied().count(), 1);
        assert_eq!(luma_after.max_count(), 100);

        let planes = result.planes();
        for ((y, x), &b) in planes[0].indexed_iter() {
            assert_eq!(b, planes[1][[y, x]]);
            assert_eq!(b, planes[2][[y, x]]);
        }
    }

    #[test]
    fn test_normalized_lut_formula() {
        // 4 samples: two at 10, one at 20, one at 30
        let plane = array![[10u8, 10], [20, 30]];
        let lut = equalization_lut(&channel_histogram(plane.view()), CdfMapping::Normalized);

        assert_eq!(lut[0], 0);
        assert_eq!(lut[10], 128); // round(255 * 2 / 4) = round(127.5)
        assert_eq!(lut[20], 191); // round(255 * 3 / 4) = round(191.25)
        assert_eq!(lut[30], 255);
    }

    #[test]
    fn test_min_shifted_lut_formula() {
        let plane = array![[10u8, 10], [20, 30]];
        let lut = equalization_lut(&channel_histogram(plane.view()), CdfMapping::MinShifted);

        assert_eq!(lut[10], 0);
        assert_eq!(lut[20], 128); // round(255 * 1 / 2)
        assert_eq!(lut[30], 255);
    }

    #[test]
    fn test_cdf_mapping_from_str() {
        assert_eq!("normalized".parse::<CdfMapping>().unwrap(), CdfMapping::Normalized);
        assert_eq!("min-shifted".parse::<CdfMapping>().unwrap(), CdfMapping::MinShifted);
        assert!("opencv".parse::<CdfMapping>().is_err());
    }

    #[test]
    fn test_min_shifted_single_value_is_identity() {
        let plane = Array2::from_elem((4, 4), 77u8);
        let result = equalize_plane(plane.view(), CdfMapping::MinShifted);
        assert_eq!(result, plane);
    }

    #[test]
    fn test_stretches_narrow_range() {
        let plane = ramp(16, 16, 100, 131);
        let result = equalize_plane(plane.view(), CdfMapping::Normalized);

        let min = result.iter().copied().min().unwrap();
        let max = result.iter().copied().max().unwrap();
        assert!(min < 20, "min {min}");
        assert_eq!(max, 255);
    }

    #[test]
    fn test_mapping_is_monotonic() {
        let plane = ramp(8, 8, 0, 200);
        let lut = equalization_lut(&channel_histogram(plane.view()), CdfMapping::Normalized);
        assert!(lut.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_chroma_untouched_by_repeated_equalization() {
        let blue = ramp(6, 9, 20, 90);
        let green = ramp(6, 9, 60, 140);
        let red = ramp(6, 9, 100, 200);
        let image = ColorImage::bgr(blue, green, red).unwrap();

        let mut yuv = LumaChroma::from_bgr(&image).unwrap();
        let (u, v) = (yuv.u.clone(), yuv.v.clone());
        for _ in 0..3 {
            equalize_luma(&mut yuv, CdfMapping::Normalized);
            assert_eq!(yuv.u, u);
            assert_eq!(yuv.v, v);
        }
    }

    #[test]
    fn test_grayscale_equalized_directly() {
        let plane = ramp(4, 8, 50, 57);
        let image = ColorImage::gray(plane.clone()).unwrap();

        let result = histogram_equalization(&image, CdfMapping::Normalized).unwrap();

        assert_eq!(result.channels(), 1);
        assert_eq!(result.planes()[0], equalize_plane(plane.view(), CdfMapping::Normalized));
    }

    #[test]
    fn test_preserves_shape() {
        let image = ColorImage::bgr(ramp(5, 7, 0, 9), ramp(5, 7, 3, 40), ramp(5, 7, 9, 99)).unwrap();
        let result = histogram_equalization(&image, CdfMapping::Normalized).unwrap();
        assert_eq!(result.dim(), (5, 7));
        assert_eq!(result.channels(), 3);
        assert_eq!(histograms(&result).len(), 3);
    }
}
