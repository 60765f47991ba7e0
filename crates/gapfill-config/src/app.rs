//! Application-wide configuration settings

use serde::{Deserialize, Serialize};

/// Application-wide configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Global log level, used when `RUST_LOG` is unset
    pub log_level: LogLevel,

    /// Include event targets in log output
    pub debug_mode: bool,
}

/// Log level configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl AppConfig {
    /// Debug flag set, or a verbose log level
    pub fn is_debug(&self) -> bool {
        self.debug_mode || matches!(self.log_level, LogLevel::Debug | LogLevel::Trace)
    }
}
