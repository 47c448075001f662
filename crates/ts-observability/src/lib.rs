//! # ts-observability
//!
//! Logging infrastructure for Threat Sentinel.

pub mod logging;

pub use logging::{init_logging, init_logging_with_config, LoggingConfig};
