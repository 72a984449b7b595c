//! Estimator configuration stored as TOML.
//!
//! ```toml
//! grid_divisions = 20
//!
//! [frame_method]
//! kind = "trimmed_mean"
//! proportion = 0.05
//! ```
//!
//! Every field is optional; missing fields take the defaults used by
//! [`TrajectoryEstimator::new`](crate::TrajectoryEstimator::new).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::estimator::{DEFAULT_GRID_DIVISIONS, FrameMethod};

/// Settings for [`TrajectoryEstimator`](crate::TrajectoryEstimator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Grid divisions; the grid samples fractions `k / grid_divisions`.
    pub grid_divisions: usize,

    /// Frame reduction method.
    pub frame_method: FrameMethod,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            grid_divisions: DEFAULT_GRID_DIVISIONS,
            frame_method: FrameMethod::default(),
        }
    }
}

impl EstimatorConfig {
    /// Replace the frame method.
    pub fn with_frame_method(mut self, method: FrameMethod) -> Self {
        self.frame_method = method;
        self
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| AnalysisError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded estimator config");
        Ok(config)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| AnalysisError::write_file(path, e))?;
        Ok(())
    }

    /// Check that an estimator built from this configuration can run.
    pub fn validate(&self) -> Result<()> {
        if self.grid_divisions < 2 {
            return Err(AnalysisError::InvalidGrid(self.grid_divisions));
        }
        self.frame_method.validate()
    }
}
