//! Operator tooling for inspecting resolved agent settings.
//!
//! This crate re-exports the settings resolver and provides the rendering
//! used by the `ingest` binary.

pub mod report;

/// Re-export for convenience.
pub use ingest_rs_settings as settings;

#[inline]
/// Initialize logging using env_logger.
///
/// Log output is controlled through `RUST_LOG`. Calling this more than once is
/// harmless.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}
