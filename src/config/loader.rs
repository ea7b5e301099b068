//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

use super::types::{CalculationConfig, EngineConfig};

/// Loads and provides access to the engine configuration.
///
/// # File Layout
///
/// ```text
/// calculation:
///   hours_per_day: "8"
///   overtime_multiplier: "2"
///   money_scale: 2
/// worker:
///   queue_capacity: 32
/// server:
///   bind_address: "0.0.0.0:8080"
/// logging:
///   level: "info"
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/payroll.yaml").unwrap();
/// println!("Hours per day: {}", loader.calculation().hours_per_day);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the YAML file at `path`.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing (`ConfigNotFound`)
    /// - The file contains invalid YAML or out-of-range values (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::from_yaml_str(&content).map_err(|err| match err {
            EngineError::ConfigParseError { message, .. } => EngineError::ConfigParseError {
                path: path_str,
                message,
            },
            other => other,
        })
    }

    /// Parses configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        let config: EngineConfig =
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;

        Self::validate(&config)?;
        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: EngineConfig) -> EngineResult<Self> {
        Self::validate(&config)?;
        Ok(Self { config })
    }

    fn validate(config: &EngineConfig) -> EngineResult<()> {
        let calculation = &config.calculation;
        if calculation.hours_per_day <= Decimal::ZERO {
            return Err(EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: "calculation.hours_per_day must be positive".to_string(),
            });
        }
        if calculation.overtime_multiplier < Decimal::ZERO {
            return Err(EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: "calculation.overtime_multiplier must not be negative".to_string(),
            });
        }
        if config.worker.queue_capacity == 0 || config.worker.outcome_capacity == 0 {
            return Err(EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: "worker capacities must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the calculation constants.
    pub fn calculation(&self) -> &CalculationConfig {
        &self.config.calculation
    }
}
