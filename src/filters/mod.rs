//! Pixel transforms of the enhancement pipeline.
//!
//! ## Supported Formats
//!
//! All filters accept a [`ColorImage`](crate::plane::ColorImage) with 1 or 3 planes:
//!
//! | Format | Planes | Type | Description |
//! |--------|--------|------|-------------|
//! | Grayscale8 | 1 | u8 | Single luminance plane, 0-255 |
//! | BGR8 | 3 | u8 | Blue, green, red, 0-255 |
//!
//! ## Architecture
//!
//! - **Plane based** - filters work on single `Array2<u8>` planes and are
//!   lifted to whole images by processing planes independently
//! - **Pure** - every call allocates its output; inputs are never modified
//! - **Thread-safe** - Rayon parallelism over planes and rows where it pays off
//!
//! ## Filter Categories
//!
//! - **Noise**: median filter ([`median`])
//! - **Tonal**: histogram equalization ([`equalize`])
//! - **Color space**: BGR <-> YUV ([`yuv`])

pub mod equalize;
pub mod median;
pub mod yuv;

pub use equalize::{equalization_lut, equalize_plane, histogram_equalization, CdfMapping};
pub use median::{median_enhance, median_filter, BorderMode, DEFAULT_FILTER_SIZE};
pub use yuv::LumaChroma;
