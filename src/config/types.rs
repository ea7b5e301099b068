//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every field has a
//! default, so a partial file (or no file at all) yields a working engine.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Calculation constants applied by the payslip calculator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    /// Flat hours credited per attended day and used to derive the hourly rate.
    pub hours_per_day: Decimal,
    /// Multiplier applied to the hourly rate for overtime hours.
    pub overtime_multiplier: Decimal,
    /// Decimal places monetary amounts are rounded to.
    pub money_scale: u32,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            hours_per_day: Decimal::from(8),
            overtime_multiplier: Decimal::from(2),
            money_scale: 2,
        }
    }
}

/// Settings for the background run worker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Maximum number of queued run jobs before submitters wait.
    pub queue_capacity: usize,
    /// Capacity of the run-outcome broadcast channel.
    pub outcome_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 32,
            outcome_capacity: 64,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the API binds to.
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Calculation constants.
    pub calculation: CalculationConfig,
    /// Run worker settings.
    pub worker: WorkerConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}
