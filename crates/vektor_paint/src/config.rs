//! Canvas configuration
//!
//! Loaded from TOML or built in code:
//!
//! ```toml
//! antialias = true
//! tess_tol = 0.25
//! dist_tol = 0.01
//! max_states = 32
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, Result};

/// Canvas settings
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CanvasConfig {
    /// Generate anti-aliasing fringes for fills and strokes
    #[serde(default = "default_true")]
    pub antialias: bool,
    /// Curve flatness tolerance at a device pixel ratio of 1
    #[serde(default = "default_tess_tol")]
    pub tess_tol: f32,
    /// Point merge distance at a device pixel ratio of 1
    #[serde(default = "default_dist_tol")]
    pub dist_tol: f32,
    /// Maximum depth of the save/restore stack
    #[serde(default = "default_max_states")]
    pub max_states: usize,
}

fn default_true() -> bool {
    true
}

fn default_tess_tol() -> f32 {
    0.25
}

fn default_dist_tol() -> f32 {
    0.01
}

fn default_max_states() -> usize {
    32
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            tess_tol: default_tess_tol(),
            dist_tol: default_dist_tol(),
            max_states: default_max_states(),
        }
    }
}

impl CanvasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_antialias(mut self, antialias: bool) -> Self {
        self.antialias = antialias;
        self
    }

    pub fn with_tolerances(mut self, tess_tol: f32, dist_tol: f32) -> Self {
        self.tess_tol = tess_tol;
        self.dist_tol = dist_tol;
        self
    }

    pub fn with_max_states(mut self, max_states: usize) -> Self {
        self.max_states = max_states;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CanvasConfig =
            toml::from_str(content).map_err(|e| CanvasError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CanvasError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.tess_tol.is_finite() || self.tess_tol <= 0.0 {
            return Err(CanvasError::Config(format!(
                "tess_tol must be positive, got {}",
                self.tess_tol
            )));
        }
        if !self.dist_tol.is_finite() || self.dist_tol <= 0.0 {
            return Err(CanvasError::Config(format!(
                "dist_tol must be positive, got {}",
                self.dist_tol
            )));
        }
        if self.max_states == 0 {
            return Err(CanvasError::Config("max_states must be at least 1".into()));
        }
        Ok(())
    }
}
