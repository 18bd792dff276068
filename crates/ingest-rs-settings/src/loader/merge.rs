//! Precedence merge across layers.

use super::LayerValues;
use crate::{ResolvedSetting, SettingKey};
use std::collections::BTreeMap;

/// Fold layers into one value per key, highest layer winning.
///
/// Layers are applied in rank order regardless of the order they are passed
/// in, so the result depends only on their contents. Values are replaced
/// whole; lists from different layers are never combined.
pub(super) fn merge_layers(mut layers: Vec<LayerValues>) -> BTreeMap<SettingKey, ResolvedSetting> {
    layers.sort_by_key(|layer| layer.layer);
    let mut merged = BTreeMap::new();
    for layer in layers {
        let source = layer.layer;
        for (key, value) in layer.values {
            merged.insert(key, ResolvedSetting { value, source });
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SettingValue, SourceLayer};
    use pretty_assertions::assert_eq;

    fn layer(source: SourceLayer, entries: &[(&str, SettingValue)]) -> LayerValues {
        let mut layer = LayerValues::empty(source);
        for (raw, value) in entries {
            layer.insert(SettingKey::parse(raw).expect("key"), value.clone());
        }
        layer
    }

    fn list(items: &[&str]) -> SettingValue {
        SettingValue::List(items.iter().map(|item| item.to_string()).collect())
    }

    #[test]
    fn highest_layer_wins_with_provenance() {
        let merged = merge_layers(vec![
            layer(SourceLayer::Default, &[("app_name", "default".into())]),
            layer(SourceLayer::File, &[("app_name", "file".into())]),
            layer(SourceLayer::SystemProperty, &[("app_name", "property".into())]),
            layer(SourceLayer::Environment, &[("app_name", "env".into())]),
        ]);
        let resolved = &merged[&SettingKey::parse("app_name").expect("key")];
        assert_eq!(resolved.value, SettingValue::Str("env".to_string()));
        assert_eq!(resolved.source, SourceLayer::Environment);
    }

    #[test]
    fn argument_order_does_not_matter() {
        let build = || {
            vec![
                layer(SourceLayer::File, &[("labels", "file".into())]),
                layer(SourceLayer::Default, &[("labels", "default".into())]),
            ]
        };
        let forward = merge_layers(build());
        let mut reversed_input = build();
        reversed_input.reverse();
        let reversed = merge_layers(reversed_input);
        assert_eq!(forward, reversed);
        let resolved = &forward[&SettingKey::parse("labels").expect("key")];
        assert_eq!(resolved.source, SourceLayer::File);
    }

    #[test]
    fn lists_are_taken_whole() {
        let merged = merge_layers(vec![
            layer(
                SourceLayer::Default,
                &[("attributes.exclude", list(&["a", "b"]))],
            ),
            layer(SourceLayer::File, &[("attributes.exclude", list(&["c"]))]),
        ]);
        let resolved = &merged[&SettingKey::parse("attributes.exclude").expect("key")];
        assert_eq!(resolved.value, list(&["c"]));
    }

    #[test]
    fn keys_from_every_layer_survive() {
        let merged = merge_layers(vec![
            layer(SourceLayer::Default, &[("a", SettingValue::Bool(true))]),
            layer(SourceLayer::Environment, &[("b", SettingValue::Int(1))]),
        ]);
        assert_eq!(merged.len(), 2);
    }
}
