//! Layered settings resolution for agent data-volume tuning.
//!
//! This crate reads the default, file, system-property, and environment
//! layers, folds their differently spelled keys into canonical keys, merges
//! them by precedence with per-key provenance, and exposes typed lookups.

mod effective;
mod error;
mod handle;
pub mod key;
pub mod loader;
mod value;

/// Merged settings and typed coercion.
pub use effective::{EffectiveConfig, FromSettingValue};
/// Public error type for resolution and access.
pub use error::SettingsError;
/// Reloadable, shared access to the effective settings.
pub use handle::SettingsHandle;
pub use key::{KeyRegistry, Notation, SettingKey};
/// Layer readers and resolver types.
pub use loader::{
    DefaultReader, EnvSource, EnvironmentReader, FileReader, LayerReader, LayerSummary,
    LayerValues, PropertyTable, Resolution, Resolver, ResolverOptions, SystemPropertyReader,
};
pub use value::{ResolvedSetting, SettingValue, SourceLayer};
