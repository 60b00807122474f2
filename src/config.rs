//! Pipeline configuration.
//!
//! ```yaml
//! filter_size: 5
//! border_mode: reference-compat
//! cdf_mapping: normalized
//! output_format: png
//! chart:
//!   width: 700
//!   height: 500
//!   title: Histogram
//! ```
//!
//! Every field is optional; missing ones take the defaults below.

use std::path::Path;

use serde::Deserialize;

use crate::codec::OutputFormat;
use crate::error::{EnhanceError, Result};
use crate::filters::{median::validate_filter_size, BorderMode, CdfMapping, DEFAULT_FILTER_SIZE};
use crate::histogram::ChartStyle;

/// Settings for an [`EnhancementService`](crate::service::EnhancementService).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Median window side length, odd
    pub filter_size: usize,
    pub border_mode: BorderMode,
    pub cdf_mapping: CdfMapping,
    /// Format of the enhanced image; `None` keeps the input format
    pub output_format: Option<OutputFormat>,
    pub chart: ChartStyle,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        EnhanceConfig {
            filter_size: DEFAULT_FILTER_SIZE,
            border_mode: BorderMode::default(),
            cdf_mapping: CdfMapping::default(),
            output_format: None,
            chart: ChartStyle::default(),
        }
    }
}

impl EnhanceConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: EnhanceConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| EnhanceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        validate_filter_size(self.filter_size)?;
        self.chart.validate()
    }
}
