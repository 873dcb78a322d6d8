//! Terminal logger for the `emlsift` binary.
//!
//! Everything goes to stderr; stdout carries only the CSV/JSON output.

use log::LevelFilter;
use simplelog::{ColorChoice, Config, ConfigBuilder, TermLogger, TerminalMode};

/// Installs the stderr logger at `level`. `LevelFilter::Off` installs nothing.
pub fn initialize(level: LevelFilter) {
    if level == LevelFilter::Off {
        return;
    }
    let _ = TermLogger::init(level, build_config(), TerminalMode::Stderr, ColorChoice::Auto);
}

fn build_config() -> Config {
    let mut builder = ConfigBuilder::new();
    builder
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .set_thread_level(LevelFilter::Debug);
    builder.build()
}
