//! Error types for the enhancement pipeline.
//!
//! Three conditions matter to callers of [`EnhancementService`](crate::service::EnhancementService):
//! undecodable input ([`EnhanceError::Decode`]), an unknown algorithm selector
//! ([`EnhanceError::UnsupportedAlgorithm`], a normal rejection) and broken plane
//! invariants ([`EnhanceError::DimensionMismatch`], a programming error).
//! The remaining variants cover parameter validation and the output side.

use thiserror::Error;

/// Errors reported by the enhancement pipeline.
#[derive(Debug, Error)]
pub enum EnhanceError {
    /// Input bytes could not be interpreted as a raster image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Output image could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// Algorithm selector did not match a recognized value.
    #[error("unsupported algorithm: {0:?}")]
    UnsupportedAlgorithm(String),

    /// Channel planes of one image differ in size.
    #[error("dimension mismatch: expected {}x{}, got {}x{}", .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        /// (height, width) of the first plane
        expected: (usize, usize),
        /// (height, width) of the offending plane
        actual: (usize, usize),
    },

    /// Images carry 1 (grayscale) or 3 (BGR) planes.
    #[error("invalid channel count: {0} (expected 1 or 3)")]
    InvalidChannelCount(usize),

    /// Median window side must be odd and positive.
    #[error("invalid filter size: {0} (must be odd and >= 1)")]
    InvalidFilterSize(usize),

    /// Image has zero rows or columns.
    #[error("empty image: {height}x{width}")]
    EmptyImage { height: usize, width: usize },

    /// Histogram chart could not be rendered.
    #[error("render error: {0}")]
    Render(String),

    /// Configuration could not be parsed or failed validation.
    #[error("config error: {0}")]
    Config(String),
}

impl EnhanceError {
    /// True for outcomes the user can correct by choosing another algorithm.
    ///
    /// These are expected results of a request rather than faults.
    pub fn is_rejection(&self) -> bool {
        matches!(self, EnhanceError::UnsupportedAlgorithm(_))
    }
}

impl From<image::ImageError> for EnhanceError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Encoding(_) => EnhanceError::Encode(e.to_string()),
            _ => EnhanceError::Decode(e.to_string()),
        }
    }
}

impl From<serde_yaml::Error> for EnhanceError {
    fn from(e: serde_yaml::Error) -> Self {
        EnhanceError::Config(e.to_string())
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, EnhanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_algorithm_is_rejection() {
        let error = EnhanceError::UnsupportedAlgorithm("bogus".to_string());
        assert!(error.is_rejection());
        assert_eq!(error.to_string(), "unsupported algorithm: \"bogus\"");
    }

    #[test]
    fn test_decode_is_not_rejection() {
        let error = EnhanceError::Decode("truncated".to_string());
        assert!(!error.is_rejection());
        assert_eq!(error.to_string(), "decode error: truncated");
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let error = EnhanceError::DimensionMismatch {
            expected: (10, 20),
            actual: (10, 19),
        };
        assert_eq!(error.to_string(), "dimension mismatch: expected 10x20, got 10x19");
    }

    #[test]
    fn test_invalid_filter_size_message() {
        let error = EnhanceError::InvalidFilterSize(4);
        assert_eq!(error.to_string(), "invalid filter size: 4 (must be odd and >= 1)");
    }
}
