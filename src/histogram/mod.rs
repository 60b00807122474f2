//! Histogram analysis: per-channel intensity counts and chart rendering.
//!
//! - [`compute`] - exact 256-bin counts per plane
//! - [`render`] - line charts (SVG, PNG, base64 PNG)

pub mod compute;
pub mod render;

pub use compute::{channel_histogram, histograms, Histogram, BINS};
pub use render::{series_color, to_base64, ChartStyle, HistogramRenderer};
