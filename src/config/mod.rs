//! Configuration for logging and processor behaviour.
//!
//! Loaded from a TOML file; every field has a default so an empty or
//! missing file is valid.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{LoggingConfig, MviConfig, ProcessorConfig};
