//! Process-level layers: system properties and environment variables.

use super::bootstrap::{CONFIG_FILE_ENV, CONFIG_FILE_PROPERTY, ENVIRONMENT_ENV};
use super::{LayerReader, LayerValues};
use crate::key::{ENV_PREFIX, Notation, PROPERTY_PREFIX, normalize};
use crate::{KeyRegistry, SettingValue, SettingsError, SourceLayer};
use log::debug;
use std::collections::BTreeMap;

/// Environment variables that locate the file layer rather than set values.
const RESERVED_ENV: &[&str] = &[CONFIG_FILE_ENV, ENVIRONMENT_ENV];

/// A process property table (`name -> value`).
///
/// Populated by the host, typically from `-Dname=value` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTable {
    entries: BTreeMap<String, String>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing an earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Set a property from `name=value`.
    pub fn insert_assignment(&mut self, assignment: &str) -> Result<(), SettingsError> {
        let (name, value) = split_assignment(assignment)?;
        self.insert(name, value);
        Ok(())
    }

    /// Build a table from JVM-style arguments; entries not starting with `-D`
    /// are ignored.
    pub fn from_jvm_args<I, S>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self::new();
        for arg in args {
            if let Some(assignment) = arg.as_ref().strip_prefix("-D") {
                table.insert_assignment(assignment)?;
            }
        }
        Ok(table)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (name, value) in iter {
            table.insert(name, value);
        }
        table
    }
}

fn split_assignment(assignment: &str) -> Result<(&str, &str), SettingsError> {
    match assignment.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(SettingsError::InvalidKey {
            raw: assignment.to_string(),
            message: "expected name=value".to_string(),
        }),
    }
}

/// Where environment variables come from.
#[derive(Debug, Clone, Default)]
pub enum EnvSource {
    /// The live process environment, read on every call.
    #[default]
    Process,
    /// A fixed snapshot.
    Fixed(BTreeMap<String, String>),
}

impl EnvSource {
    /// A fixed snapshot from `(name, value)` pairs.
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EnvSource::Fixed(
            vars.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// All variables, sorted by name. Non-UTF-8 entries are skipped.
    pub fn vars(&self) -> Vec<(String, String)> {
        match self {
            EnvSource::Process => {
                let mut vars: Vec<(String, String)> = std::env::vars_os()
                    .filter_map(|(name, value)| {
                        Some((name.into_string().ok()?, value.into_string().ok()?))
                    })
                    .collect();
                vars.sort();
                vars
            }
            EnvSource::Fixed(vars) => vars
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            EnvSource::Process => std::env::var(name).ok(),
            EnvSource::Fixed(vars) => vars.get(name).cloned(),
        }
    }
}

/// Reads `newrelic.config.*` entries from a property table.
#[derive(Debug, Clone, Default)]
pub struct SystemPropertyReader {
    table: PropertyTable,
}

impl SystemPropertyReader {
    pub fn new(table: PropertyTable) -> Self {
        Self { table }
    }
}

impl LayerReader for SystemPropertyReader {
    fn layer(&self) -> SourceLayer {
        SourceLayer::SystemProperty
    }

    fn read(&self, registry: &KeyRegistry) -> Result<LayerValues, SettingsError> {
        let mut layer = LayerValues::empty(SourceLayer::SystemProperty);
        for (name, value) in self.table.iter() {
            if !name.starts_with(PROPERTY_PREFIX) || name == CONFIG_FILE_PROPERTY {
                continue;
            }
            match normalize(name, Notation::SystemProperty, registry) {
                Ok(key) => layer.insert(key, SettingValue::Str(value.to_string())),
                Err(err) => layer.drop_key(name, &err),
            }
        }
        debug!("system property layer has {} entries", layer.values.len());
        Ok(layer)
    }
}

/// Reads `NEW_RELIC_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentReader {
    source: EnvSource,
}

impl EnvironmentReader {
    pub fn new(source: EnvSource) -> Self {
        Self { source }
    }
}

impl LayerReader for EnvironmentReader {
    fn layer(&self) -> SourceLayer {
        SourceLayer::Environment
    }

    fn read(&self, registry: &KeyRegistry) -> Result<LayerValues, SettingsError> {
        let mut layer = LayerValues::empty(SourceLayer::Environment);
        for (name, value) in self.source.vars() {
            if !name.starts_with(ENV_PREFIX) || RESERVED_ENV.contains(&name.as_str()) {
                continue;
            }
            match normalize(&name, Notation::Environment, registry) {
                Ok(key) => layer.insert(key, SettingValue::Str(value)),
                Err(err) => layer.drop_key(name, &err),
            }
        }
        debug!("environment layer has {} entries", layer.values.len());
        Ok(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SettingKey;
    use pretty_assertions::assert_eq;

    fn key(raw: &str) -> SettingKey {
        SettingKey::parse(raw).expect("key")
    }

    #[test]
    fn jvm_args_populate_table() {
        let table = PropertyTable::from_jvm_args([
            "-Xmx512m",
            "-Dnewrelic.config.span_events.max_samples_stored=500",
            "-Dnewrelic.environment=production",
        ])
        .expect("table");
        assert_eq!(
            table.get("newrelic.config.span_events.max_samples_stored"),
            Some("500")
        );
        assert_eq!(table.get("newrelic.environment"), Some("production"));
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn assignment_without_equals_is_rejected() {
        let mut table = PropertyTable::new();
        assert!(table.insert_assignment("newrelic.config.jfr.enabled").is_err());
        assert!(table.insert_assignment("=true").is_err());
    }

    #[test]
    fn property_reader_filters_prefix_and_bootstrap() {
        let table: PropertyTable = [
            ("newrelic.config.jfr.enabled", "true"),
            ("newrelic.config.file", "/etc/newrelic.yml"),
            ("java.version", "21"),
        ]
        .into_iter()
        .collect();
        let layer = SystemPropertyReader::new(table)
            .read(&KeyRegistry::builtin())
            .expect("layer");
        assert_eq!(layer.values.len(), 1);
        assert_eq!(
            layer.values.get(&key("jfr.enabled")),
            Some(&SettingValue::Str("true".to_string()))
        );
    }

    #[test]
    fn property_reader_accepts_unregistered_keys() {
        let table: PropertyTable = [("newrelic.config.custom.thing", "x")].into_iter().collect();
        let layer = SystemPropertyReader::new(table)
            .read(&KeyRegistry::builtin())
            .expect("layer");
        assert!(layer.values.contains_key(&key("custom.thing")));
    }

    #[test]
    fn environment_reader_drops_unresolvable_names() {
        let env = EnvSource::fixed([
            ("NEW_RELIC_APPLICATION_LOGGING_ENABLED", "FALSE"),
            ("NEW_RELIC_NOT_A_SETTING", "1"),
            ("NEW_RELIC_CONFIG_FILE", "/etc/newrelic.yml"),
            ("PATH", "/usr/bin"),
        ]);
        let layer = EnvironmentReader::new(env)
            .read(&KeyRegistry::builtin())
            .expect("layer");
        assert_eq!(layer.values.len(), 1);
        assert_eq!(
            layer.values.get(&key("application_logging.enabled")),
            Some(&SettingValue::Str("FALSE".to_string()))
        );
        assert_eq!(layer.dropped.len(), 1);
        assert_eq!(layer.dropped[0].raw, "NEW_RELIC_NOT_A_SETTING");
    }

    #[test]
    fn environment_reader_is_idempotent() {
        let env = EnvSource::fixed([("NEW_RELIC_APP_NAME", "Checkout")]);
        let reader = EnvironmentReader::new(env);
        let registry = KeyRegistry::builtin();
        let first = reader.read(&registry).expect("first");
        let second = reader.read(&registry).expect("second");
        assert_eq!(first.values, second.values);
    }
}
