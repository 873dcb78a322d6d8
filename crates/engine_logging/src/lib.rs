#![deny(missing_docs)]
//! Shared logging utilities for the emlsift workspace.
//!
//! Library crates never talk to `log` directly; they go through the
//! `engine_*` macros below so every record lands under the same target and
//! per-file diagnostics always carry the offending path.

/// Log target used by every macro in this crate.
pub const TARGET: &str = "emlsift";

/// Logs a trace-level message under the workspace target.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs a debug-level message under the workspace target.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs an info-level message under the workspace target.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs a warn-level message under the workspace target.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs an error-level message under the workspace target.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs a warning about one input file, prefixed with its path.
///
/// `engine_file_warn!(path, "rename failed: {}", err)` renders as
/// `[path] rename failed: ...`.
#[macro_export]
macro_rules! engine_file_warn {
    ($path:expr, $($arg:tt)*) => {{
        log::warn!(
            target: $crate::TARGET,
            "[{}] {}",
            ::std::path::Path::display(::std::convert::AsRef::<::std::path::Path>::as_ref(&$path)),
            format_args!($($arg)*)
        );
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Stdout belongs to the output sink, so tests log to stderr as well.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]);
}
