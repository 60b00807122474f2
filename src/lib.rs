//! ImageStag Enhance
//!
//! Image enhancement pipeline: per-channel median filtering, luma
//! histogram equalization and before/after histogram charts, with Python
//! bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! Images are held as separate 8-bit channel planes:
//! - **Grayscale**: one plane
//! - **BGR**: three planes in blue, green, red order
//!
//! Array-based bindings take and return `(height, width, channels)` u8
//! arrays with the same channel order.
//!
//! ## Pipeline
//! ```text
//! bytes -> decode -> ColorImage -> {median | equalize} -> ColorImage -> encode -> bytes
//!                        |                                    |
//!                        +---------> histograms -> charts <---+
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod filters;
pub mod histogram;
pub mod plane;
pub mod service;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use codec::{decode, encode, Decoded, OutputFormat};
pub use config::EnhanceConfig;
pub use error::{EnhanceError, Result};
pub use filters::{histogram_equalization, median_enhance, median_filter, BorderMode, CdfMapping};
pub use histogram::{histograms, ChartStyle, Histogram, HistogramRenderer};
pub use plane::{ChannelPlane, ColorImage};
pub use service::{
    histogram_after_name, histogram_before_name, output_file_name, Algorithm, EnhancementResult,
    EnhancementService,
};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use ndarray::Array2;
    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;
    use pyo3::types::PyBytes;

    use crate::config::EnhanceConfig;
    use crate::error::EnhanceError;
    use crate::filters::{self, BorderMode, CdfMapping};
    use crate::histogram::{self, BINS};
    use crate::plane::ColorImage;
    use crate::service::EnhancementService;

    fn to_py_err(e: EnhanceError) -> PyErr {
        PyValueError::new_err(e.to_string())
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Median filter each channel of a (H, W, C) u8 image.
    ///
    /// `border` is "zero" or "reference-compat".
    #[pyfunction]
    #[pyo3(signature = (image, filter_size=3, border="zero"))]
    pub fn median_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        filter_size: usize,
        border: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let border: BorderMode = border.parse().map_err(to_py_err)?;
        let input = ColorImage::from_hwc(image.as_array()).map_err(to_py_err)?;
        let result = filters::median_enhance(&input, filter_size, border).map_err(to_py_err)?;
        Ok(result.to_hwc().into_pyarray(py))
    }

    /// Equalize the luma histogram of a (H, W, C) u8 image.
    ///
    /// `mapping` is "normalized" or "min-shifted".
    #[pyfunction]
    #[pyo3(signature = (image, mapping="normalized"))]
    pub fn histogram_equalization<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        mapping: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let mapping: CdfMapping = mapping.parse().map_err(to_py_err)?;
        let input = ColorImage::from_hwc(image.as_array()).map_err(to_py_err)?;
        let result = filters::histogram_equalization(&input, mapping).map_err(to_py_err)?;
        Ok(result.to_hwc().into_pyarray(py))
    }

    // ========================================================================
    // Histograms
    // ========================================================================

    /// Per-channel 256-bin histograms as a (C, 256) u64 array.
    #[pyfunction]
    pub fn channel_histograms<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray2<u64>>> {
        let input = ColorImage::from_hwc(image.as_array()).map_err(to_py_err)?;
        let hists = histogram::histograms(&input);
        let counts = Array2::from_shape_fn((hists.len(), BINS), |(c, v)| hists[c].bins()[v]);
        Ok(counts.into_pyarray(py))
    }

    // ========================================================================
    // Full Pipeline
    // ========================================================================

    /// Enhance encoded image bytes.
    ///
    /// Returns `(enhanced_bytes, histogram_before_base64, histogram_after_base64)`.
    #[pyfunction]
    #[pyo3(signature = (data, algorithm, filter_size=3))]
    pub fn enhance_bytes<'py>(
        py: Python<'py>,
        data: &[u8],
        algorithm: Option<&str>,
        filter_size: usize,
    ) -> PyResult<(Bound<'py, PyBytes>, String, String)> {
        let config = EnhanceConfig {
            filter_size,
            ..Default::default()
        };
        let service = EnhancementService::new(config).map_err(to_py_err)?;
        let result = service.process_bytes(data, algorithm).map_err(to_py_err)?;

        Ok((
            PyBytes::new(py, &result.encoded),
            result.histogram_before_base64(),
            result.histogram_after_base64(),
        ))
    }

    // ========================================================================
    // Module Registration
    // ========================================================================

    #[pymodule]
    pub fn imagestag_enhance(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(median_filter, m)?)?;
        m.add_function(wrap_pyfunction!(histogram_equalization, m)?)?;
        m.add_function(wrap_pyfunction!(channel_histograms, m)?)?;
        m.add_function(wrap_pyfunction!(enhance_bytes, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::imagestag_enhance;
