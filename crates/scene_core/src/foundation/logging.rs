//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Defaults to `info` when `RUST_LOG` is unset.
///
/// # Panics
/// Panics if a global logger has already been installed.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Initialize the logging system, ignoring an already installed logger
///
/// Safe to call from every test.
pub fn try_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
