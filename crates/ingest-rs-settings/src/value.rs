//! Setting values, layers, and provenance.

use serde::Serialize;
use std::fmt;

/// Origin for a single settings layer.
///
/// Variants are declared from lowest to highest precedence, so the derived
/// ordering is the merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLayer {
    /// Built-in agent defaults (lowest precedence).
    Default,
    /// The YAML settings file.
    File,
    /// `newrelic.config.*` process properties.
    SystemProperty,
    /// `NEW_RELIC_*` environment variables (highest precedence).
    Environment,
}

impl SourceLayer {
    /// Short label used in logs and CLI output.
    pub fn label(self) -> &'static str {
        match self {
            SourceLayer::Default => "default",
            SourceLayer::File => "file",
            SourceLayer::SystemProperty => "system_property",
            SourceLayer::Environment => "environment",
        }
    }
}

impl fmt::Display for SourceLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A raw setting value as read from one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl SettingValue {
    /// Name of the variant, used in type mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "boolean",
            SettingValue::Int(_) => "integer",
            SettingValue::Str(_) => "string",
            SettingValue::List(_) => "list",
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{value}"),
            SettingValue::Int(value) => write!(f, "{value}"),
            SettingValue::Str(value) => write!(f, "{value:?}"),
            SettingValue::List(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Int(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Str(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Str(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(values: Vec<String>) -> Self {
        SettingValue::List(values)
    }
}

/// The winning value for one key plus the layer that supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSetting {
    pub value: SettingValue,
    pub source: SourceLayer,
}
