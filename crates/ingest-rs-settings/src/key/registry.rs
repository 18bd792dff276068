//! Registry of known canonical keys used to disambiguate environment names.

use super::SettingKey;
use log::debug;
use std::collections::{BTreeSet, HashSet};

/// Canonical keys the agent understands out of the box.
pub const BUILTIN_KEYS: &[&str] = &[
    "app_name",
    "license_key",
    "log_level",
    "log_file_name",
    "log_file_path",
    "audit_mode",
    "high_security",
    "labels",
    "host",
    "proxy_host",
    "proxy_port",
    "proxy_user",
    "proxy_password",
    "max_stack_trace_lines",
    "enable_auto_app_naming",
    "send_data_on_exit",
    "attributes.enabled",
    "attributes.include",
    "attributes.exclude",
    "transaction_events.enabled",
    "transaction_events.max_samples_stored",
    "transaction_events.attributes.include",
    "transaction_events.attributes.exclude",
    "span_events.enabled",
    "span_events.max_samples_stored",
    "span_events.attributes.include",
    "span_events.attributes.exclude",
    "custom_insights_events.enabled",
    "custom_insights_events.max_samples_stored",
    "custom_insights_events.max_attribute_value",
    "error_collector.enabled",
    "error_collector.capture_events",
    "error_collector.max_event_samples_stored",
    "error_collector.ignore_status_codes",
    "error_collector.expected_status_codes",
    "transaction_tracer.enabled",
    "transaction_tracer.transaction_threshold",
    "transaction_tracer.record_sql",
    "transaction_tracer.explain_enabled",
    "transaction_tracer.stack_trace_threshold",
    "transaction_tracer.top_n",
    "slow_sql.enabled",
    "distributed_tracing.enabled",
    "browser_monitoring.auto_instrument",
    "application_logging.enabled",
    "application_logging.forwarding.enabled",
    "application_logging.forwarding.max_samples_stored",
    "application_logging.forwarding.context_data.enabled",
    "application_logging.metrics.enabled",
    "application_logging.local_decorating.enabled",
    "code_level_metrics.enabled",
    "jfr.enabled",
    "thread_profiler.enabled",
];

/// Known canonical keys plus the segment vocabulary derived from them.
#[derive(Debug, Clone, Default)]
pub struct KeyRegistry {
    keys: BTreeSet<SettingKey>,
    segments: HashSet<String>,
}

impl KeyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with [`BUILTIN_KEYS`].
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for raw in BUILTIN_KEYS {
            if let Ok(key) = SettingKey::parse(raw) {
                registry.register(key);
            }
        }
        registry
    }

    /// Add a key and its segments to the registry.
    pub fn register(&mut self, key: SettingKey) {
        for segment in key.segments() {
            self.segments.insert(segment.to_string());
        }
        self.keys.insert(key);
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &SettingKey) -> bool {
        self.keys.contains(key)
    }

    /// Registered keys in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = &SettingKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Registered keys whose environment spelling matches `name`.
    ///
    /// `name` is the lower-cased variable name with the prefix removed. Each
    /// grouping of its `_`-separated words into known segment names is tried;
    /// only groupings that form a registered key survive. The result is sorted.
    pub fn env_candidates(&self, name: &str) -> Vec<SettingKey> {
        let words: Vec<&str> = name.split('_').collect();
        let mut path = Vec::new();
        let mut found = BTreeSet::new();
        self.collect_groupings(&words, &mut path, &mut found);
        debug!(
            "environment name {name} matched {} registered key(s)",
            found.len()
        );
        found.into_iter().collect()
    }

    fn collect_groupings(
        &self,
        words: &[&str],
        path: &mut Vec<String>,
        found: &mut BTreeSet<SettingKey>,
    ) {
        if words.is_empty() {
            if let Ok(key) = SettingKey::from_segments(path.iter()) {
                if self.keys.contains(&key) {
                    found.insert(key);
                }
            }
            return;
        }
        for end in 1..=words.len() {
            let segment = words[..end].join("_");
            if !self.segments.contains(&segment) {
                continue;
            }
            path.push(segment);
            self.collect_groupings(&words[end..], path, found);
            path.pop();
        }
    }
}
