//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system from `RUST_LOG`
///
/// Panics if a global logger is already installed; tools and tests that may
/// initialise more than once should call [`try_init`] instead.
pub fn init() {
    env_logger::init();
}

/// Initialize the logging system, ignoring an already-installed logger
///
/// Returns `true` when this call installed the logger.
pub fn try_init() -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(cfg!(test))
        .try_init()
        .is_ok()
}
