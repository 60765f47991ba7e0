//! Logging bootstrap
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to every
//! target.

use crate::app::AppConfig;
use tracing_subscriber::EnvFilter;

/// Filter built from `RUST_LOG`, falling back to the configured level
pub fn env_filter(app: &AppConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(app.log_level.as_directive()))
}

/// Install the global fmt subscriber
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(app: &AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(app))
        .with_target(app.is_debug())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::LogLevel;

    #[test]
    fn test_init_tracing_once() {
        let app = AppConfig {
            log_level: LogLevel::Debug,
            ..Default::default()
        };

        // First install may race with other tests in the same binary; the
        // second call in this test must always fail.
        let _ = init_tracing(&app);
        assert!(init_tracing(&app).is_err());
    }
}
