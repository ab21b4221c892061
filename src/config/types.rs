use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MviConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set (default: "info").
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Include the event target (module path) in each line (default: true).
    #[serde(default = "default_with_target")]
    pub with_target: bool,
}

/// Per-processor behaviour toggles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Emit a `trace` record for every applied intent (default: false).
    #[serde(default)]
    pub trace_intents: bool,
    /// Log effects sent with no observer at `warn` instead of `debug` (default: false).
    #[serde(default)]
    pub warn_on_dropped_effects: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_with_target() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            with_target: default_with_target(),
        }
    }
}
