//! Logging facade shared by the folio crates.
//!
//! The level is taken from the `FOLIO_LOG` environment variable:
//! - `off` (default) - nothing is emitted
//! - `error`, `warn`, `info`, `debug` - minimum level written to stderr
//!
//! Crates depending on this one must also depend on `emit`, because the
//! macros below expand to `emit` macros.

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

static INIT: Once = Once::new();

/// Environment variable consulted by [`init_diagnostics`].
pub const LOG_ENV: &str = "FOLIO_LOG";

/// Parsed value of `FOLIO_LOG`. `None` means logging is off.
///
/// Unknown values map to `Info` and set the second tuple element so the
/// caller can warn once the emitter is running.
#[must_use]
pub fn parse_level(value: &str) -> (Option<emit::Level>, bool) {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => (None, false),
        "error" => (Some(emit::Level::Error), false),
        "warn" => (Some(emit::Level::Warn), false),
        "info" => (Some(emit::Level::Info), false),
        "debug" => (Some(emit::Level::Debug), false),
        _ => (Some(emit::Level::Info), true),
    }
}

/// Initialize diagnostics based on the `FOLIO_LOG` environment variable.
///
/// Safe to call multiple times; only the first call configures the emitter.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let raw = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        let (level, unknown) = parse_level(&raw);

        let Some(level) = level else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        if unknown {
            emit::warn!("Unknown {LOG_ENV} value {raw}, using info", LOG_ENV, raw: raw.as_str());
        }

        // The runtime lives for the rest of the process.
        std::mem::forget(rt);
    });
}

/// Log basic operations (dumps, restores, collections)
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (per-entry mutations, batch flushes)
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log warning conditions (self-healing, recoverable inconsistencies)
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log error conditions
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Short form of [`log_info!`].
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Short form of [`log_debug!`].
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Short form of [`log_warn!`].
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Short form of [`log_error!`].
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init_diagnostics();
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("off"), (None, false));
        assert_eq!(parse_level(""), (None, false));
        assert_eq!(parse_level("DEBUG"), (Some(emit::Level::Debug), false));
        assert_eq!(parse_level(" warn "), (Some(emit::Level::Warn), false));
        assert_eq!(parse_level("chatty"), (Some(emit::Level::Info), true));
    }

    #[test]
    fn test_macros_compile() {
        log_info!("Test message");
        log_debug!("Debug message with {value}", value: 42);
        info!("Test message");
        debug!("Debug message with {value}", value: 42);
        warn!("Warning message");
        error!("Error message");
    }
}
