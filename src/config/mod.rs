// src/config/mod.rs

//! Scalar parameters of a waveguide run, with defaults and validation.
//!
//! Parameters can be built in code (`ConfiguratorParams::default()`) or read
//! from a TOML table; any field left out takes its default.

use crate::EngineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// User-facing inputs to [`crate::SimulationConfigurator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfiguratorParams {
    /// Side length of the cubic domain (µm).
    #[serde(default = "default_sim_size")]
    pub sim_size: f64,
    #[serde(default = "default_wg_extent")]
    pub wg_width: f64,
    #[serde(default = "default_wg_extent")]
    pub wg_height: f64,
    #[serde(default = "default_wg_permittivity")]
    pub wg_permittivity: f64,
    /// Centre wavelength (µm).
    #[serde(default = "default_lambda0")]
    pub lambda0: f64,
    /// Source bandwidth as a fraction of the centre frequency.
    #[serde(default = "default_source_width")]
    pub source_width: f64,
    /// Run time (s).
    #[serde(default = "default_runtime")]
    pub runtime: f64,
    /// Minimum grid steps per wavelength.
    #[serde(default = "default_resolution")]
    pub resolution: u32,
    /// Solve for modes as part of [`crate::SimulationConfigurator::launch`].
    #[serde(default = "default_true")]
    pub run: bool,
    /// Number of frequency samples in the mode sweep.
    #[serde(default = "default_freq_count")]
    pub freq_count: usize,
    #[serde(default = "default_num_modes")]
    pub num_modes: usize,
}

fn default_sim_size() -> f64 {
    6.0
}
fn default_wg_extent() -> f64 {
    1.5
}
fn default_wg_permittivity() -> f64 {
    6.0
}
fn default_lambda0() -> f64 {
    2.0
}
fn default_source_width() -> f64 {
    0.35
}
fn default_runtime() -> f64 {
    1e-12
}
fn default_resolution() -> u32 {
    20
}
fn default_true() -> bool {
    true
}
fn default_freq_count() -> usize {
    20
}
fn default_num_modes() -> usize {
    5
}

impl Default for ConfiguratorParams {
    fn default() -> Self {
        Self {
            sim_size: default_sim_size(),
            wg_width: default_wg_extent(),
            wg_height: default_wg_extent(),
            wg_permittivity: default_wg_permittivity(),
            lambda0: default_lambda0(),
            source_width: default_source_width(),
            runtime: default_runtime(),
            resolution: default_resolution(),
            run: default_true(),
            freq_count: default_freq_count(),
            num_modes: default_num_modes(),
        }
    }
}

impl ConfiguratorParams {
    /// Checks every field before anything is built from it.
    pub fn validate(&self) -> Result<(), EngineError> {
        let positive = [
            ("sim_size", self.sim_size),
            ("wg_width", self.wg_width),
            ("wg_height", self.wg_height),
            ("lambda0", self.lambda0),
            ("source_width", self.source_width),
            ("runtime", self.runtime),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(EngineError::Configuration(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        if !(self.wg_permittivity >= 1.0) || !self.wg_permittivity.is_finite() {
            return Err(EngineError::Configuration(format!(
                "wg_permittivity must be >= 1, got {}",
                self.wg_permittivity
            )));
        }
        if self.resolution == 0 {
            return Err(EngineError::Configuration("resolution must be at least 1".to_string()));
        }
        if self.freq_count == 0 {
            return Err(EngineError::Configuration("freq_count must be at least 1".to_string()));
        }
        if self.num_modes == 0 {
            return Err(EngineError::Configuration("num_modes must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Parses a TOML table of parameters.
    pub fn from_toml_str(content: &str) -> Result<Self, EngineError> {
        let params: ConfiguratorParams =
            toml::from_str(content).map_err(|e| EngineError::Configuration(format!("Invalid parameter file: {}", e)))?;
        params.validate()?;
        Ok(params)
    }
}

/// Loads and validates parameters from a TOML file.
pub fn load_params(path: &Path) -> Result<ConfiguratorParams, EngineError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        EngineError::Configuration(format!("Failed to read {}: {}", path.display(), e))
    })?;
    ConfiguratorParams::from_toml_str(&content)
}
