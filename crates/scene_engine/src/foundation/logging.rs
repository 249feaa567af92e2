//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system with a default filter
///
/// `RUST_LOG` still takes precedence when it is set. Returns an error when a
/// logger has already been installed for this process.
pub fn init_with_level(default_filter: &str) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .try_init()
}
