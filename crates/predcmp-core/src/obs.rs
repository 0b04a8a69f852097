//! Logging infrastructure for predcmp.
//!
//! predcmp uses `tracing` for structured logging. All events use target
//! "predcmp" and include `component` and `event` fields for filtering.
//!
//! The library never installs a subscriber; applications configure tracing
//! via `tracing_subscriber` or similar.
//!
//! Conventions:
//! - `event`: snake_case event name (required)
//! - `component`: subsystem (e.g. "compare", "session")
//! - Use `%` for Display, `?` for Debug formatting

/// Target for all predcmp log events.
pub(crate) const PREDCMP_TARGET: &str = "predcmp";

/// Macro for debug-level log events.
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::obs::PREDCMP_TARGET, $($field)*)
    };
}

/// Macro for trace-level log events.
macro_rules! log_trace {
    ($($field:tt)*) => {
        ::tracing::trace!(target: $crate::obs::PREDCMP_TARGET, $($field)*)
    };
}

/// Macro for warn-level log events.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::obs::PREDCMP_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_trace;
pub(crate) use log_warn;
