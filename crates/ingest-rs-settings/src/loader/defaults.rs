//! Built-in agent defaults, the lowest layer.

use super::{LayerReader, LayerValues};
use crate::{KeyRegistry, SettingKey, SettingValue, SettingsError, SourceLayer};
use SettingValue::{Bool, Int};

/// Produces the hardcoded default values.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReader;

/// Default values keyed by canonical key.
fn builtin_defaults() -> Vec<(&'static str, SettingValue)> {
    vec![
        ("app_name", "My Application".into()),
        ("log_level", "info".into()),
        ("audit_mode", Bool(false)),
        ("high_security", Bool(false)),
        ("max_stack_trace_lines", Int(30)),
        ("enable_auto_app_naming", Bool(false)),
        ("send_data_on_exit", Bool(false)),
        ("attributes.enabled", Bool(true)),
        ("transaction_events.enabled", Bool(true)),
        ("transaction_events.max_samples_stored", Int(2000)),
        ("span_events.enabled", Bool(true)),
        ("span_events.max_samples_stored", Int(2000)),
        ("custom_insights_events.enabled", Bool(true)),
        ("custom_insights_events.max_samples_stored", Int(30000)),
        ("custom_insights_events.max_attribute_value", Int(255)),
        ("error_collector.enabled", Bool(true)),
        ("error_collector.capture_events", Bool(true)),
        ("error_collector.max_event_samples_stored", Int(100)),
        (
            "error_collector.ignore_status_codes",
            vec!["404".to_string()].into(),
        ),
        ("transaction_tracer.enabled", Bool(true)),
        ("transaction_tracer.transaction_threshold", "apdex_f".into()),
        ("transaction_tracer.record_sql", "obfuscated".into()),
        ("transaction_tracer.explain_enabled", Bool(true)),
        ("transaction_tracer.stack_trace_threshold", "0.5".into()),
        ("transaction_tracer.top_n", Int(20)),
        ("slow_sql.enabled", Bool(false)),
        ("distributed_tracing.enabled", Bool(true)),
        ("browser_monitoring.auto_instrument", Bool(true)),
        ("application_logging.enabled", Bool(true)),
        ("application_logging.forwarding.enabled", Bool(true)),
        ("application_logging.forwarding.max_samples_stored", Int(10000)),
        ("application_logging.forwarding.context_data.enabled", Bool(false)),
        ("application_logging.metrics.enabled", Bool(true)),
        ("application_logging.local_decorating.enabled", Bool(false)),
        ("code_level_metrics.enabled", Bool(true)),
        ("jfr.enabled", Bool(false)),
        ("thread_profiler.enabled", Bool(true)),
    ]
}

impl LayerReader for DefaultReader {
    fn layer(&self) -> SourceLayer {
        SourceLayer::Default
    }

    fn read(&self, _registry: &KeyRegistry) -> Result<LayerValues, SettingsError> {
        let mut layer = LayerValues::empty(SourceLayer::Default);
        for (raw, value) in builtin_defaults() {
            layer.insert(SettingKey::parse(raw)?, value);
        }
        Ok(layer)
    }
}
