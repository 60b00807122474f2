//! Plane-based image container.
//!
//! Filters in this crate work on single 8-bit planes ([`ChannelPlane`]).
//! A [`ColorImage`] is an ordered stack of 1 (grayscale) or 3 (colour) planes.
//!
//! ## Channel order
//!
//! Colour images store planes as **blue, green, red**, the native order of the
//! decoders this pipeline was modelled on. The order is kept through
//! decode/encode round trips (see [`crate::codec`]).
//!
//! | Planes | Layout | Description |
//! |--------|--------|-------------|
//! | 1 | `[gray]` | Single luminance plane, 0-255 |
//! | 3 | `[b, g, r]` | Blue, green, red, 0-255 |

use ndarray::{Array2, Array3, ArrayView3, Axis};

use crate::error::{EnhanceError, Result};

/// Plane index of blue in a colour image.
pub const BLUE: usize = 0;
/// Plane index of green in a colour image.
pub const GREEN: usize = 1;
/// Plane index of red in a colour image.
pub const RED: usize = 2;

/// A `height x width` grid of 8-bit samples.
pub type ChannelPlane = Array2<u8>;

/// Ordered stack of equally sized channel planes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorImage {
    planes: Vec<ChannelPlane>,
}

impl ColorImage {
    /// Build an image from planes in storage order.
    ///
    /// # Errors
    /// * [`EnhanceError::InvalidChannelCount`] unless there are 1 or 3 planes
    /// * [`EnhanceError::EmptyImage`] if a plane has no rows or columns
    /// * [`EnhanceError::DimensionMismatch`] if plane sizes differ
    pub fn from_planes(planes: Vec<ChannelPlane>) -> Result<Self> {
        if planes.len() != 1 && planes.len() != 3 {
            return Err(EnhanceError::InvalidChannelCount(planes.len()));
        }

        let expected = planes[0].dim();
        if expected.0 == 0 || expected.1 == 0 {
            return Err(EnhanceError::EmptyImage {
                height: expected.0,
                width: expected.1,
            });
        }
        if let Some(bad) = planes.iter().find(|p| p.dim() != expected) {
            return Err(EnhanceError::DimensionMismatch {
                expected,
                actual: bad.dim(),
            });
        }

        Ok(ColorImage { planes })
    }

    /// Single-plane grayscale image.
    pub fn gray(plane: ChannelPlane) -> Result<Self> {
        Self::from_planes(vec![plane])
    }

    /// Colour image from blue, green and red planes.
    pub fn bgr(blue: ChannelPlane, green: ChannelPlane, red: ChannelPlane) -> Result<Self> {
        Self::from_planes(vec![blue, green, red])
    }

    /// Image where every sample of every plane equals `value`.
    pub fn filled(height: usize, width: usize, channels: usize, value: u8) -> Result<Self> {
        Self::from_planes(vec![Array2::from_elem((height, width), value); channels])
    }

    /// Split an interleaved `(height, width, channels)` array into planes.
    ///
    /// The channel axis is taken as storage order (BGR for colour).
    pub fn from_hwc(input: ArrayView3<u8>) -> Result<Self> {
        let planes = input
            .axis_iter(Axis(2))
            .map(|plane| plane.to_owned())
            .collect();
        Self::from_planes(planes)
    }

    /// Interleave planes into a `(height, width, channels)` array.
    pub fn to_hwc(&self) -> Array3<u8> {
        let (height, width) = self.dim();
        Array3::from_shape_fn((height, width, self.channels()), |(y, x, c)| {
            self.planes[c][[y, x]]
        })
    }

    /// (height, width) shared by all planes.
    pub fn dim(&self) -> (usize, usize) {
        self.planes[0].dim()
    }

    pub fn height(&self) -> usize {
        self.dim().0
    }

    pub fn width(&self) -> usize {
        self.dim().1
    }

    /// Number of planes (1 or 3).
    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    pub fn is_grayscale(&self) -> bool {
        self.planes.len() == 1
    }

    /// Planes in storage order.
    pub fn planes(&self) -> &[ChannelPlane] {
        &self.planes
    }

    /// Plane at `index`, or `None` past the last plane.
    pub fn plane(&self, index: usize) -> Option<&ChannelPlane> {
        self.planes.get(index)
    }

    /// Take the planes back out, in storage order.
    pub fn into_planes(self) -> Vec<ChannelPlane> {
        self.planes
    }
}
