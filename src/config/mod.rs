//! Configuration loading and management for the payroll engine.
//!
//! This module loads the engine configuration from a YAML file: calculation
//! constants, run worker sizing, the HTTP bind address and the log level.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/payroll.yaml").unwrap();
//! println!("Binding to {}", config.config().server.bind_address);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{CalculationConfig, EngineConfig, LoggingConfig, ServerConfig, WorkerConfig};
