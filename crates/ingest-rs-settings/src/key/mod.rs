//! Canonical setting keys and the three external key notations.
//!
//! Every layer spells keys differently: the YAML file nests mappings, the
//! environment uses `NEW_RELIC_` plus upper-case `_`-joined words, and process
//! properties use `newrelic.config.` plus dotted lower-case segments. This
//! module folds all three into one [`SettingKey`] so the merger can compare
//! keys across layers.

mod registry;


pub use registry::{BUILTIN_KEYS, KeyRegistry};

use crate::SettingsError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Prefix for setting environment variables.
pub const ENV_PREFIX: &str = "NEW_RELIC_";
/// Prefix for setting process properties.
pub const PROPERTY_PREFIX: &str = "newrelic.config.";

/// Canonical, case-folded dotted identifier for one configuration option.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SettingKey(String);

impl SettingKey {
    /// Parse a dotted key, folding case and `-` into the canonical form.
    pub fn parse(raw: &str) -> Result<Self, SettingsError> {
        Self::from_segments(raw.split('.'))
    }

    /// Build a key from individual path segments.
    ///
    /// Segments may themselves contain dots; they are split further.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical = Vec::new();
        let mut raw_parts = Vec::new();
        for segment in segments {
            let segment = segment.as_ref();
            raw_parts.push(segment.to_string());
            for part in segment.split('.') {
                canonical.push(canonical_segment(part));
            }
        }
        let raw = raw_parts.join(".");
        if canonical.is_empty() || canonical.iter().any(String::is_empty) {
            return Err(SettingsError::InvalidKey {
                raw,
                message: "key contains an empty segment".to_string(),
            });
        }
        Ok(SettingKey(canonical.join(".")))
    }

    /// The canonical dotted form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// The environment variable that addresses this key.
    pub fn env_var_name(&self) -> String {
        format!("{ENV_PREFIX}{}", self.0.replace('.', "_").to_ascii_uppercase())
    }

    /// The process property that addresses this key.
    pub fn property_name(&self) -> String {
        format!("{PROPERTY_PREFIX}{}", self.0)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::parse(s)
    }
}

impl AsRef<str> for SettingKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SettingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// External spelling a raw key arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// Path of nested YAML mapping keys joined with `.`.
    File,
    /// `NEW_RELIC_<WORD>_<WORD>...`.
    Environment,
    /// `newrelic.config.<segment>.<segment>...`.
    SystemProperty,
}

/// Normalize a raw key spelled in `notation` into a canonical key.
///
/// Environment names are resolved against `registry`; the other notations map
/// directly.
pub fn normalize(
    raw: &str,
    notation: Notation,
    registry: &KeyRegistry,
) -> Result<SettingKey, SettingsError> {
    match notation {
        Notation::File => SettingKey::parse(raw),
        Notation::SystemProperty => {
            let rest = raw
                .strip_prefix(PROPERTY_PREFIX)
                .ok_or_else(|| missing_prefix(raw, PROPERTY_PREFIX))?;
            SettingKey::parse(rest)
        }
        Notation::Environment => {
            let rest = raw
                .strip_prefix(ENV_PREFIX)
                .ok_or_else(|| missing_prefix(raw, ENV_PREFIX))?;
            if rest.is_empty() {
                return Err(SettingsError::InvalidKey {
                    raw: raw.to_string(),
                    message: "nothing follows the prefix".to_string(),
                });
            }
            let mut candidates = registry.env_candidates(&rest.to_ascii_lowercase());
            if candidates.len() == 1 {
                Ok(candidates.remove(0))
            } else {
                Err(SettingsError::AmbiguousKey {
                    var: raw.to_string(),
                    candidates: candidates
                        .into_iter()
                        .map(|key| key.as_str().to_string())
                        .collect(),
                })
            }
        }
    }
}

fn canonical_segment(segment: &str) -> String {
    segment.trim().to_ascii_lowercase().replace('-', "_")
}

fn missing_prefix(raw: &str, prefix: &str) -> SettingsError {
    SettingsError::InvalidKey {
        raw: raw.to_string(),
        message: format!("expected prefix {prefix}"),
    }
}
