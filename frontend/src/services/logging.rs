use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber once; `RUST_LOG` takes precedence over `default_filter`.
///
/// Returns false when another subscriber was already installed.
pub fn init_logging(default_filter: &str) -> bool {
    static INSTALLED: OnceLock<bool> = OnceLock::new();

    *INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .is_ok()
    })
}

/// Component-scoped log helpers for the view layer
pub struct Logger;

impl Logger {
    pub fn debug_with_component(component: &str, message: &str) {
        tracing::debug!(component = component, "{}", message);
    }

    pub fn info_with_component(component: &str, message: &str) {
        tracing::info!(component = component, "{}", message);
    }

    pub fn warn_with_component(component: &str, message: &str) {
        tracing::warn!(component = component, "{}", message);
    }

    pub fn error_with_component(component: &str, message: &str) {
        tracing::error!(component = component, "{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        let first = init_logging("debug");
        let second = init_logging("info");
        assert_eq!(first, second);
        Logger::info_with_component("logging-test", "subscriber ready");
    }
}
