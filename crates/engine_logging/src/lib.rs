#![deny(missing_docs)]
//! Logging macros shared by the conversion workspace.
//!
//! Every crate logs through the `engine_*` macros so the backend can be
//! swapped in one place. The embedding shell installs the real logger; tests
//! use [`initialize_for_tests`].

/// Target used for records emitted by the batch registry and job runner.
pub const BATCH_TARGET: &str = "speedy::batch";

/// Target used for records emitted while assembling archives.
pub const ARCHIVE_TARGET: &str = "speedy::archive";

/// Logs a trace-level message.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Installs a terminal logger for unit and integration tests.
///
/// Debug builds log at `Debug`, release builds at `Info`. Calling this more
/// than once, or after another logger was installed, is harmless.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Codec crates are chatty at debug level.
    let config = ConfigBuilder::new()
        .add_filter_allow_str("speedy")
        .build();

    let _ = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto);
}
