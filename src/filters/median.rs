//! Median filter for noise reduction.
//!
//! Odd square window centred on each pixel, samples outside the plane count
//! as zero, output is the middle element of the sorted window. Colour images
//! are filtered plane by plane with no cross-channel interaction.
//!
//! ## Border Modes
//!
//! - **Zero**: every out-of-range window position contributes one zero.
//!   Windows always hold `filter_size²` samples.
//! - **ReferenceCompat**: reproduces the legacy gather loop bit for bit.
//!   A window row above or below the plane contributes `filter_size` zeros.
//!   Otherwise the column test compares `x + z - indexer` (row offset `z`,
//!   not the column offset) against 0 and `x + indexer` against the last
//!   column. A failing test contributes a single zero for the whole window
//!   row. Passing rows read columns `x + k - indexer`, where a negative
//!   column wraps around to `width + col`. Windows can hold fewer than
//!   `filter_size²` samples and the median is taken from what was gathered.
//!
//! ## Performance
//!
//! Naive O(n × k² log k) window sort. Output rows are computed in parallel
//! with Rayon and planes are filtered in parallel; every output sample reads
//! only the input plane.

use std::str::FromStr;

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use serde::Deserialize;

use crate::error::{EnhanceError, Result};
use crate::plane::{ChannelPlane, ColorImage};

/// Window side used when the caller does not pick one.
pub const DEFAULT_FILTER_SIZE: usize = 3;

/// Boundary policy for window positions outside the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderMode {
    /// Symmetric zero padding.
    #[default]
    Zero,
    /// Legacy asymmetric column check, kept for output parity.
    ReferenceCompat,
}

impl FromStr for BorderMode {
    type Err = EnhanceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zero" => Ok(BorderMode::Zero),
            "reference-compat" => Ok(BorderMode::ReferenceCompat),
            other => Err(EnhanceError::Config(format!("unknown border mode {other:?}"))),
        }
    }
}

/// Reject even or zero window sizes.
pub fn validate_filter_size(filter_size: usize) -> Result<()> {
    if filter_size == 0 || filter_size % 2 == 0 {
        return Err(EnhanceError::InvalidFilterSize(filter_size));
    }
    Ok(())
}

// ============================================================================
// Single Plane
// ============================================================================

/// Apply the median filter to one channel plane.
///
/// # Arguments
/// * `plane` - Input samples (height, width)
/// * `filter_size` - Window side, odd and >= 1
/// * `border` - Boundary policy
///
/// # Returns
/// New plane with the same dimensions
pub fn median_filter(
    plane: ArrayView2<u8>,
    filter_size: usize,
    border: BorderMode,
) -> Result<ChannelPlane> {
    validate_filter_size(filter_size)?;

    let (height, width) = plane.dim();
    if height == 0 || width == 0 {
        return Ok(plane.to_owned());
    }

    let mut output_flat = vec![0u8; height * width];
    output_flat
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let mut window = Vec::with_capacity(filter_size * filter_size);
            for (x, out) in row.iter_mut().enumerate() {
                window.clear();
                match border {
                    BorderMode::Zero => gather_zero_padded(plane, y, x, filter_size, &mut window),
                    BorderMode::ReferenceCompat => {
                        gather_reference_compat(plane, y, x, filter_size, &mut window)
                    }
                }
                window.sort_unstable();
                *out = window[window.len() / 2];
            }
        });

    Array2::from_shape_vec((height, width), output_flat).map_err(|_| {
        EnhanceError::DimensionMismatch {
            expected: (height, width),
            actual: (0, 0),
        }
    })
}

/// Collect the full `filter_size²` window, zeros outside the plane.
fn gather_zero_padded(
    plane: ArrayView2<u8>,
    y: usize,
    x: usize,
    filter_size: usize,
    window: &mut Vec<u8>,
) {
    let (height, width) = plane.dim();
    let indexer = (filter_size / 2) as isize;

    for dy in 0..filter_size {
        let sy = y as isize + dy as isize - indexer;
        let row_inside = sy >= 0 && sy < height as isize;

        for dx in 0..filter_size {
            let sx = x as isize + dx as isize - indexer;
            if row_inside && sx >= 0 && sx < width as isize {
                window.push(plane[[sy as usize, sx as usize]]);
            } else {
                window.push(0);
            }
        }
    }
}

/// Collect a window the way the legacy loop did (see module docs).
fn gather_reference_compat(
    plane: ArrayView2<u8>,
    y: usize,
    x: usize,
    filter_size: usize,
    window: &mut Vec<u8>,
) {
    let (height, width) = plane.dim();
    let (height, width) = (height as isize, width as isize);
    let indexer = (filter_size / 2) as isize;
    let (y, x) = (y as isize, x as isize);

    for z in 0..filter_size as isize {
        let sy = y + z - indexer;
        if sy < 0 || sy > height - 1 {
            window.extend(std::iter::repeat(0).take(filter_size));
        } else if x + z - indexer < 0 || x + indexer > width - 1 {
            window.push(0);
        } else {
            for k in 0..filter_size as isize {
                let mut sx = x + k - indexer;
                if sx < 0 {
                    sx += width;
                }
                window.push(plane[[sy as usize, sx as usize]]);
            }
        }
    }
}

// ============================================================================
// Whole Image
// ============================================================================

/// Median-filter every plane of an image independently.
///
/// # Returns
/// Image with the same dimensions, channel count and channel order
pub fn median_enhance(
    image: &ColorImage,
    filter_size: usize,
    border: BorderMode,
) -> Result<ColorImage> {
    validate_filter_size(filter_size)?;

    let planes = image
        .planes()
        .par_iter()
        .map(|plane| median_filter(plane.view(), filter_size, border))
        .collect::<Result<Vec<_>>>()?;

    ColorImage::from_planes(planes)
}
