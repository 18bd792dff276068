//! Text and JSON rendering of resolved settings.

use clap::ValueEnum;
use ingest_rs_settings::{
    EffectiveConfig, LayerSummary, SettingValue, SettingsError, SourceLayer,
};
use serde::Serialize;
use std::fmt::Write as _;

/// Keys whose values are masked unless explicitly revealed.
pub const SECRET_KEYS: &[&str] = &["license_key", "proxy_password"];

const MASK: &str = "****";

/// One row of `ingest show` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowEntry {
    pub key: String,
    pub value: SettingValue,
    pub source: SourceLayer,
}

/// Target type for `ingest get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueType {
    Bool,
    Int,
    String,
    List,
}

/// Collect every effective setting, masking secrets unless `reveal` is set.
pub fn show_entries(config: &EffectiveConfig, reveal: bool) -> Vec<ShowEntry> {
    config
        .iter()
        .map(|(key, resolved)| {
            let value = if !reveal && SECRET_KEYS.contains(&key.as_str()) {
                SettingValue::Str(MASK.to_string())
            } else {
                resolved.value.clone()
            };
            ShowEntry {
                key: key.as_str().to_string(),
                value,
                source: resolved.source,
            }
        })
        .collect()
}

/// Render entries as aligned `key = value  [layer]` lines.
pub fn render_text(entries: &[ShowEntry]) -> String {
    let width = entries.iter().map(|entry| entry.key.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{:<width$} = {}  [{}]",
            entry.key, entry.value, entry.source
        );
    }
    out
}

/// Render entries as a pretty JSON array.
pub fn render_json(entries: &[ShowEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}

/// Coerce one setting and render it, or `None` when absent.
pub fn typed_value(
    config: &EffectiveConfig,
    key: &str,
    ty: ValueType,
) -> Result<Option<String>, SettingsError> {
    let rendered = match ty {
        ValueType::Bool => config.get_opt::<bool>(key)?.map(|v| v.to_string()),
        ValueType::Int => config.get_opt::<i64>(key)?.map(|v| v.to_string()),
        ValueType::String => config.get_opt::<String>(key)?,
        ValueType::List => config.get_opt::<Vec<String>>(key)?.map(|v| v.join("\n")),
    };
    Ok(rendered)
}

/// Describe each layer and any keys it dropped.
///
/// Returns the report and the total number of dropped keys.
pub fn render_check(layers: &[LayerSummary]) -> (String, usize) {
    let mut out = String::new();
    let mut dropped = 0;
    for layer in layers {
        let origin = layer
            .path
            .as_ref()
            .map(|path| format!(" ({})", path.display()))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}{}: {} value(s), {} dropped",
            layer.source,
            origin,
            layer.entries,
            layer.dropped.len()
        );
        for key in &layer.dropped {
            let _ = writeln!(out, "  dropped {}: {}", key.raw, key.reason);
        }
        dropped += layer.dropped.len();
    }
    (out, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ingest_rs_settings::{EnvSource, Resolver, ResolverOptions};
    use pretty_assertions::assert_eq;

    fn resolve(env: &[(&str, &str)]) -> ingest_rs_settings::Resolution {
        let options = ResolverOptions::new().with_env(EnvSource::fixed(env.iter().copied()));
        Resolver::new(options).resolve().expect("resolve")
    }

    #[test]
    fn secrets_are_masked_unless_revealed() {
        let resolution = resolve(&[("NEW_RELIC_LICENSE_KEY", "abc123")]);
        let masked = show_entries(&resolution.config, false);
        let license = masked
            .iter()
            .find(|entry| entry.key == "license_key")
            .expect("license");
        assert_eq!(license.value, SettingValue::Str(MASK.to_string()));
        assert_eq!(license.source, SourceLayer::Environment);

        let revealed = show_entries(&resolution.config, true);
        let license = revealed
            .iter()
            .find(|entry| entry.key == "license_key")
            .expect("license");
        assert_eq!(license.value, SettingValue::Str("abc123".to_string()));
    }

    #[test]
    fn text_lines_are_sorted_and_tagged() {
        let entries = vec![
            ShowEntry {
                key: "a".to_string(),
                value: SettingValue::Bool(true),
                source: SourceLayer::Default,
            },
            ShowEntry {
                key: "bbb".to_string(),
                value: SettingValue::Int(5),
                source: SourceLayer::File,
            },
        ];
        assert_eq!(
            render_text(&entries),
            "a   = true  [default]\nbbb = 5  [file]\n"
        );
    }

    #[test]
    fn json_uses_plain_values() {
        let entries = vec![ShowEntry {
            key: "attributes.exclude".to_string(),
            value: SettingValue::List(vec!["a".to_string()]),
            source: SourceLayer::SystemProperty,
        }];
        let json = render_json(&entries).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(
            parsed,
            serde_json::json!([{
                "key": "attributes.exclude",
                "value": ["a"],
                "source": "system_property"
            }])
        );
    }

    #[test]
    fn typed_value_coerces_and_reports_absence() {
        let resolution = resolve(&[("NEW_RELIC_APPLICATION_LOGGING_ENABLED", "FALSE")]);
        assert_eq!(
            typed_value(&resolution.config, "application_logging.enabled", ValueType::Bool)
                .expect("bool"),
            Some("false".to_string())
        );
        assert_eq!(
            typed_value(&resolution.config, "nonexistent.key", ValueType::Bool).expect("bool"),
            None
        );
        assert!(typed_value(&resolution.config, "app_name", ValueType::Int).is_err());
    }

    #[test]
    fn check_counts_dropped_keys() {
        let resolution = resolve(&[("NEW_RELIC_BOGUS_SETTING", "1")]);
        let (report, dropped) = render_check(&resolution.layers);
        assert_eq!(dropped, 1);
        assert!(report.contains("dropped NEW_RELIC_BOGUS_SETTING"));
    }
}
