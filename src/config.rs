//! Configuration management for the compliance screening pipeline

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::warn;

use crate::types::alert::AlertTag;

/// Named monetary thresholds read by the detectors.
#[derive(Debug, Clone, Deserialize)]
pub struct Thresholds {
    /// Mandatory declaration threshold
    pub regulatory: f64,
    /// Amount above which a transfer is treated as exceptional
    pub exceptional: f64,
    /// Per-transaction ceiling under which a payment can take part in a
    /// structuring pattern
    pub structuring: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            regulatory: 10_000.0,
            exceptional: 100_000.0,
            structuring: 9_500.0,
        }
    }
}

/// Immutable screening configuration: thresholds, sanctioned jurisdictions
/// and the score weight contributed by each detector.
///
/// Loaded once per run and passed by reference into the engine; no module
/// holds mutable shared state.
#[derive(Debug, Clone, Deserialize)]
pub struct ScreeningConfig {
    #[serde(default)]
    pub thresholds: Thresholds,

    /// ISO country codes subject to sanctions
    #[serde(default = "default_sanctioned_countries")]
    pub sanctioned_countries: HashSet<String>,

    /// Score weight per alert tag. Tags absent from the map fall back to
    /// their built-in default weight.
    #[serde(default)]
    pub weights: HashMap<AlertTag, u32>,
}

fn default_sanctioned_countries() -> HashSet<String> {
    ["RU", "SY", "IR", "KP", "CU", "VE"]
        .iter()
        .map(|code| code.to_string())
        .collect()
}

impl ScreeningConfig {
    /// Load configuration from the well-known path.
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/screening.toml")
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Load configuration from a path, substituting the built-in defaults
    /// when the file is absent or malformed. The substitution is reported,
    /// never fatal.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_path(path.as_ref()) {
            Ok(config) => config,
            Err(error) => {
                warn!(
                    path = %path.as_ref().display(),
                    error = %error,
                    "Falling back to default screening configuration"
                );
                Self::default()
            }
        }
    }

    /// Score weight for a tag, falling back to the tag's built-in default.
    pub fn weight(&self, tag: AlertTag) -> u32 {
        self.weights
            .get(&tag)
            .copied()
            .unwrap_or_else(|| tag.default_weight())
    }

    pub fn is_sanctioned(&self, country: &str) -> bool {
        self.sanctioned_countries.contains(country)
    }
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            sanctioned_countries: default_sanctioned_countries(),
            weights: HashMap::new(),
        }
    }
}
