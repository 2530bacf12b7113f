//! Configuration API for PII detection

use crate::api::Error;
use crate::domain::{PiiType, TypePriorities, TypeThresholds};
use crate::extraction::{ScoringWeights, DEFAULT_PROXIMITY_WINDOW};
use crate::language::{english_lexicon, DepartmentConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Detection configuration
///
/// Every key is optional when read from TOML; listed priorities and
/// thresholds override the defaults for those types only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub(crate) proximity_window: usize,
    pub(crate) priorities: TypePriorities,
    pub(crate) thresholds: TypeThresholds,
    pub(crate) weights: ScoringWeights,
    pub(crate) departments: DepartmentConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proximity_window: DEFAULT_PROXIMITY_WINDOW,
            priorities: TypePriorities::default(),
            thresholds: TypeThresholds::default(),
            weights: ScoringWeights::default(),
            departments: english_lexicon().departments().clone(),
        }
    }
}

impl Config {
    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Infrastructure(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String, Error> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check ranges: window > 0, thresholds in `[0, 1]`, finite weights
    pub fn validate(&self) -> Result<(), Error> {
        if self.proximity_window == 0 {
            return Err(Error::Configuration(
                "proximity_window must be greater than 0".into(),
            ));
        }

        for (ty, threshold) in self.thresholds.entries() {
            if !threshold.is_finite() || !(0.0..=1.0).contains(threshold) {
                return Err(Error::Configuration(format!(
                    "threshold for {ty} must be within [0, 1], got {threshold}"
                )));
            }
        }

        for (name, weight) in self.weights.named() {
            if !weight.is_finite() {
                return Err(Error::Configuration(format!(
                    "weight {name} must be a finite number"
                )));
            }
        }

        Ok(())
    }

    /// Distance in bytes for the near-other-PII signal
    pub fn proximity_window(&self) -> usize {
        self.proximity_window
    }

    pub fn priorities(&self) -> &TypePriorities {
        &self.priorities
    }

    pub fn thresholds(&self) -> &TypeThresholds {
        &self.thresholds
    }

    /// Threshold for one type (0.0 when unset)
    pub fn threshold(&self, ty: PiiType) -> f64 {
        self.thresholds.get(ty)
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Department prefix/suffix lists used by the scorer
    pub fn departments(&self) -> &DepartmentConfig {
        &self.departments
    }
}

/// Fluent builder for configuration
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    proximity_window: Option<usize>,
    priorities: Vec<(PiiType, i32)>,
    thresholds: Vec<(PiiType, f64)>,
    weights: Option<ScoringWeights>,
    departments: Option<DepartmentConfig>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the proximity window in bytes
    pub fn proximity_window(mut self, bytes: usize) -> Self {
        self.proximity_window = Some(bytes);
        self
    }

    /// Override the priority of one type
    pub fn priority(mut self, ty: PiiType, priority: i32) -> Self {
        self.priorities.push((ty, priority));
        self
    }

    /// Override the threshold of one type
    pub fn threshold(mut self, ty: PiiType, threshold: f64) -> Self {
        self.thresholds.push((ty, threshold));
        self
    }

    /// Shorthand for the properNoun threshold
    pub fn proper_noun_threshold(self, threshold: f64) -> Self {
        self.threshold(PiiType::ProperNoun, threshold)
    }

    /// Replace all scoring weights
    pub fn weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = Some(weights);
        self
    }

    /// Replace the department lists
    pub fn departments(mut self, departments: DepartmentConfig) -> Self {
        self.departments = Some(departments);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config, Error> {
        let mut config = Config::default();

        if let Some(window) = self.proximity_window {
            config.proximity_window = window;
        }
        for (ty, priority) in self.priorities {
            config.priorities.set(ty, priority);
        }
        for (ty, threshold) in self.thresholds {
            config.thresholds.set(ty, threshold);
        }
        if let Some(weights) = self.weights {
            config.weights = weights;
        }
        if let Some(departments) = self.departments {
            config.departments = departments;
        }

        config.validate()?;
        Ok(config)
    }
}
