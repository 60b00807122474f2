//! Enhancement service.
//!
//! One request runs through
//!
//! ```text
//! Received -> Decoded -> HistogramBefore -> Transformed -> HistogramAfter -> Complete
//!          \-> Rejected   (unknown algorithm selector)
//! ```
//!
//! The service holds only its configuration and chart renderer; nothing is
//! carried over between requests, so one instance can serve concurrent
//! callers. Persisting the results is left to the caller, with
//! [`output_file_name`] and the chart name helpers reproducing the naming
//! scheme of the upload page.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::codec::{self, OutputFormat};
use crate::config::EnhanceConfig;
use crate::error::{EnhanceError, Result};
use crate::filters::{histogram_equalization, median_enhance};
use crate::histogram::{histograms, to_base64, Histogram, HistogramRenderer};
use crate::plane::ColorImage;

// ============================================================================
// Algorithm selection
// ============================================================================

/// Transform applied to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Per-channel median filter (selector `"Med_Filter"`)
    MedianFilter,
    /// Luma histogram equalization (selector `"Hist_Equalization"`)
    HistogramEqualization,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::MedianFilter, Algorithm::HistogramEqualization];

    /// Form selector string.
    pub fn selector(self) -> &'static str {
        match self {
            Algorithm::MedianFilter => "Med_Filter",
            Algorithm::HistogramEqualization => "Hist_Equalization",
        }
    }

    /// Suffix appended to the file stem of an enhanced image.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Algorithm::MedianFilter => "_medfil",
            Algorithm::HistogramEqualization => "_hiseq",
        }
    }

    /// Parse an optional selector. Missing and empty selectors are rejected
    /// like any other unknown value.
    pub fn from_selector(selector: Option<&str>) -> Result<Self> {
        selector.unwrap_or_default().parse()
    }
}

impl FromStr for Algorithm {
    type Err = EnhanceError;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.selector() == s)
            .ok_or_else(|| EnhanceError::UnsupportedAlgorithm(s.to_string()))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// Request lifecycle stage, reported in trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Decoded,
    HistogramBefore,
    Transformed,
    HistogramAfter,
    Complete,
    Rejected,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestState::Received => "received",
            RequestState::Decoded => "decoded",
            RequestState::HistogramBefore => "histogram_before",
            RequestState::Transformed => "transformed",
            RequestState::HistogramAfter => "histogram_after",
            RequestState::Complete => "complete",
            RequestState::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Results
// ============================================================================

/// Everything produced by one request.
#[derive(Debug, Clone)]
pub struct EnhancementResult {
    pub algorithm: Algorithm,
    /// Enhanced planes
    pub image: ColorImage,
    /// Enhanced image encoded in `format`
    pub encoded: Vec<u8>,
    pub format: OutputFormat,
    pub histograms_before: Vec<Histogram>,
    pub histograms_after: Vec<Histogram>,
    /// PNG chart of the input histograms
    pub histogram_before_png: Vec<u8>,
    /// PNG chart of the output histograms
    pub histogram_after_png: Vec<u8>,
}

impl EnhancementResult {
    pub fn encoded_base64(&self) -> String {
        to_base64(&self.encoded)
    }

    pub fn histogram_before_base64(&self) -> String {
        to_base64(&self.histogram_before_png)
    }

    pub fn histogram_after_base64(&self) -> String {
        to_base64(&self.histogram_after_png)
    }
}

// ============================================================================
// Service
// ============================================================================

/// Runs enhancement requests with a fixed configuration.
pub struct EnhancementService {
    config: EnhanceConfig,
    renderer: HistogramRenderer,
}

impl EnhancementService {
    /// Validate `config` and prepare the chart renderer.
    pub fn new(config: EnhanceConfig) -> Result<Self> {
        config.validate()?;
        let renderer = HistogramRenderer::new(config.chart.clone());
        Ok(EnhancementService { config, renderer })
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    /// Apply `algorithm` to `image` without producing charts.
    pub fn transform(&self, image: &ColorImage, algorithm: Algorithm) -> Result<ColorImage> {
        match algorithm {
            Algorithm::MedianFilter => {
                median_enhance(image, self.config.filter_size, self.config.border_mode)
            }
            Algorithm::HistogramEqualization => {
                histogram_equalization(image, self.config.cdf_mapping)
            }
        }
    }

    /// Enhance a decoded image.
    ///
    /// The enhanced image is encoded in the configured output format, PNG
    /// when none is set.
    pub fn process(&self, image: &ColorImage, algorithm: Algorithm) -> Result<EnhancementResult> {
        let format = self.config.output_format.unwrap_or(OutputFormat::Png);
        self.run(image, algorithm, format)
    }

    /// Decode `bytes`, enhance them with the algorithm named by `selector`
    /// and encode the result in the input's own format (unless the
    /// configuration overrides it).
    ///
    /// # Errors
    /// - [`EnhanceError::Decode`] for empty or undecodable bytes
    /// - [`EnhanceError::UnsupportedAlgorithm`] for an unknown selector;
    ///   nothing is produced in that case
    pub fn process_bytes(&self, bytes: &[u8], selector: Option<&str>) -> Result<EnhancementResult> {
        debug!(state = %RequestState::Received, len = bytes.len());

        if bytes.is_empty() {
            return Err(EnhanceError::Decode("no image supplied".to_string()));
        }

        let algorithm = match Algorithm::from_selector(selector) {
            Ok(a) => a,
            Err(e) => {
                warn!(state = %RequestState::Rejected, selector = ?selector, "Unsupported algorithm");
                return Err(e);
            }
        };

        let decoded = codec::decode(bytes)?;
        let (height, width) = decoded.image.dim();
        debug!(
            state = %RequestState::Decoded,
            height,
            width,
            channels = decoded.image.channels(),
            format = ?decoded.format
        );

        let format = self.config.output_format.unwrap_or(decoded.format);
        self.run(&decoded.image, algorithm, format)
    }

    fn run(
        &self,
        image: &ColorImage,
        algorithm: Algorithm,
        format: OutputFormat,
    ) -> Result<EnhancementResult> {
        let histograms_before = histograms(image);
        let histogram_before_png = self.renderer.render_png(&histograms_before)?;
        debug!(state = %RequestState::HistogramBefore, bytes = histogram_before_png.len());

        let enhanced = self.transform(image, algorithm)?;
        let encoded = codec::encode(&enhanced, format)?;
        debug!(state = %RequestState::Transformed, %algorithm, bytes = encoded.len());

        let histograms_after = histograms(&enhanced);
        let histogram_after_png = self.renderer.render_png(&histograms_after)?;
        debug!(state = %RequestState::HistogramAfter, bytes = histogram_after_png.len());

        let (height, width) = enhanced.dim();
        info!(state = %RequestState::Complete, %algorithm, height, width, format = ?format, "Image enhanced");

        Ok(EnhancementResult {
            algorithm,
            image: enhanced,
            encoded,
            format,
            histograms_before,
            histograms_after,
            histogram_before_png,
            histogram_after_png,
        })
    }
}

// ============================================================================
// Output names
// ============================================================================

/// Name of the enhanced image: `{stem}{suffix}{ext}`, e.g. `cat_medfil.jpg`.
pub fn output_file_name(original: &str, algorithm: Algorithm) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!("{stem}{}{ext}", algorithm.file_suffix())
}

/// Name of the chart for the uploaded image.
pub fn histogram_before_name(file_name: &str) -> String {
    format!("{file_name}_before.png")
}

/// Name of the chart for the enhanced image.
pub fn histogram_after_name(enhanced_name: &str) -> String {
    format!("{enhanced_name}_after.png")
}
