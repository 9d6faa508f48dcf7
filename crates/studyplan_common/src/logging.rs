//! Logging setup shared by the Studyplan binaries.
//!
//! Everything in the workspace logs through `tracing` macros; this module only
//! installs the subscriber.

use std::str::FromStr;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
///
/// ```
/// use studyplan_common::logging;
///
/// logging::init();
/// logging::init_with_level(tracing::Level::DEBUG); // no-op, already initialized
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific level for the `studyplan`
/// crates. `RUST_LOG` directives are honoured on top of it.
pub fn init_with_level(level: Level) {
    // target matching is by prefix, so this covers every studyplan_* crate
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("studyplan={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    // try_init: a global subscriber may already be installed (tests, repeated calls)
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize from a configured level name such as `"debug"`. Unknown names
/// fall back to INFO.
pub fn init_from_name(level: &str) {
    match Level::from_str(level) {
        Ok(level) => init_with_level(level),
        Err(_) => {
            init();
            warn!("Unknown log level '{}', using INFO", level);
        }
    }
}
