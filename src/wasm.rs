//! WebAssembly exports for the enhancement filters.
//!
//! These functions are exposed to JavaScript via wasm-bindgen.
//!
//! ## Buffer Layout
//!
//! Images are passed as flat interleaved u8 buffers of length
//! `width * height * channels`, with `channels` either 1 (grayscale) or
//! 3 (BGR). Invalid sizes and parameters are raised as JavaScript errors.

use ndarray::{Array2, Array3};
use wasm_bindgen::prelude::*;

use crate::error::EnhanceError;
use crate::filters::{self, BorderMode, CdfMapping};
use crate::histogram::{self, BINS};
use crate::plane::ColorImage;

fn to_js_err(e: EnhanceError) -> JsError {
    JsError::new(&e.to_string())
}

fn planes_from_flat(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<ColorImage, JsError> {
    let input = Array3::from_shape_vec((height, width, channels), data.to_vec()).map_err(|_| {
        JsError::new(&format!(
            "buffer of {} bytes does not match {width}x{height}x{channels}",
            data.len()
        ))
    })?;
    ColorImage::from_hwc(input.view()).map_err(to_js_err)
}

// ============================================================================
// Median Filter
// ============================================================================

/// Median filter each channel.
///
/// # Arguments
/// * `data` - Flat array of bytes (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - 1 or 3
/// * `filter_size` - Odd window side
/// * `border` - "zero" or "reference-compat"
///
/// # Returns
/// Flat array of filtered bytes, same layout as the input
#[wasm_bindgen]
pub fn median_filter_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    filter_size: usize,
    border: &str,
) -> Result<Vec<u8>, JsError> {
    let border: BorderMode = border.parse().map_err(to_js_err)?;
    let image = planes_from_flat(data, width, height, channels)?;

    let result = filters::median_enhance(&image, filter_size, border).map_err(to_js_err)?;
    Ok(result.to_hwc().into_raw_vec_and_offset().0)
}

// ============================================================================
// Histogram Equalization
// ============================================================================

/// Equalize the luma histogram.
///
/// # Arguments
/// * `data` - Flat array of bytes (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - 1 or 3
/// * `mapping` - "normalized" or "min-shifted"
///
/// # Returns
/// Flat array of equalized bytes, same layout as the input
#[wasm_bindgen]
pub fn histogram_equalization_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    mapping: &str,
) -> Result<Vec<u8>, JsError> {
    let mapping: CdfMapping = mapping.parse().map_err(to_js_err)?;
    let image = planes_from_flat(data, width, height, channels)?;

    let result = filters::histogram_equalization(&image, mapping).map_err(to_js_err)?;
    Ok(result.to_hwc().into_raw_vec_and_offset().0)
}

// ============================================================================
// Histograms
// ============================================================================

/// Per-channel histograms, `channels * 256` counts laid out channel by channel.
///
/// Counts are returned as f64 so they map onto a plain JavaScript array.
#[wasm_bindgen]
pub fn channel_histograms_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<Vec<f64>, JsError> {
    let image = planes_from_flat(data, width, height, channels)?;
    let hists = histogram::histograms(&image);

    let counts = Array2::from_shape_fn((hists.len(), BINS), |(c, v)| hists[c].bins()[v] as f64);
    Ok(counts.into_raw_vec_and_offset().0)
}
