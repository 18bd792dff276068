//! Reading and flattening the YAML settings file.

use super::{LayerReader, LayerValues};
use crate::{KeyRegistry, SettingKey, SettingValue, SettingsError, SourceLayer};
use log::{debug, warn};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Root mapping shared by every environment section.
const COMMON_SECTION: &str = "common";

/// Reads the file layer from an explicit path or the first existing search path.
#[derive(Debug, Clone, Default)]
pub struct FileReader {
    explicit: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
    environment: Option<String>,
}

impl FileReader {
    pub fn new(
        explicit: Option<PathBuf>,
        search_paths: Vec<PathBuf>,
        environment: Option<String>,
    ) -> Self {
        Self {
            explicit,
            search_paths,
            environment,
        }
    }

    /// The file that would be read right now, if any.
    fn locate(&self) -> Result<Option<PathBuf>, SettingsError> {
        if let Some(path) = &self.explicit {
            if !path.exists() {
                return Err(SettingsError::FileNotFound(path.clone()));
            }
            return Ok(Some(path.clone()));
        }
        for path in &self.search_paths {
            if path.is_file() {
                return Ok(Some(path.clone()));
            }
            debug!("settings file candidate missing (path={})", path.display());
        }
        Ok(None)
    }
}

impl LayerReader for FileReader {
    fn layer(&self) -> SourceLayer {
        SourceLayer::File
    }

    fn read(&self, registry: &KeyRegistry) -> Result<LayerValues, SettingsError> {
        let Some(path) = self.locate()? else {
            debug!("no settings file specified; file layer is empty");
            return Ok(LayerValues::empty(SourceLayer::File));
        };
        debug!("loading settings file (path={})", path.display());
        let contents = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SettingsError::FileNotFound(path.clone())
            } else {
                SettingsError::Read {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        let mut layer = parse_layer(&contents, &path, self.environment.as_deref(), registry)?;
        layer.origin = Some(path);
        Ok(layer)
    }
}

/// Parse YAML contents into a flat file layer.
///
/// A root `common` mapping, or a selected environment section present at the
/// root, switches to the sectioned layout: `common` is flattened first, the
/// selected section is overlaid, and other mappings are treated as unselected
/// sections. Anything else at the root is dropped.
pub(crate) fn parse_layer(
    contents: &str,
    path: &Path,
    environment: Option<&str>,
    registry: &KeyRegistry,
) -> Result<LayerValues, SettingsError> {
    let parse_err = |source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let mut document: Value = serde_yaml::from_str(contents).map_err(parse_err)?;
    document.apply_merge().map_err(parse_err)?;

    let mut layer = LayerValues::empty(SourceLayer::File);
    let root = match document {
        Value::Null => return Ok(layer),
        Value::Mapping(root) => root,
        other => {
            return Err(SettingsError::InvalidValue {
                path: "<root>".to_string(),
                message: format!("expected a mapping, found {}", yaml_kind(&other)),
            });
        }
    };

    let common = match root.get(COMMON_SECTION) {
        Some(Value::Mapping(common)) => Some(common),
        _ => None,
    };
    let section = match environment.map(|name| (name, root.get(name))) {
        Some((_, Some(Value::Mapping(section)))) => Some(section),
        Some((name, Some(other))) if common.is_some() => {
            return Err(SettingsError::InvalidValue {
                path: name.to_string(),
                message: format!("expected a mapping, found {}", yaml_kind(other)),
            });
        }
        Some((name, _)) => {
            warn!("settings section {name} not found; ignoring the selection");
            None
        }
        None => None,
    };
    if common.is_none() && section.is_none() {
        flatten_mapping(&root, &mut Vec::new(), &mut layer)?;
        return Ok(layer);
    }

    if let Some(common) = common {
        flatten_mapping(common, &mut Vec::new(), &mut layer)?;
    }
    if let (Some(name), Some(section)) = (environment, section) {
        debug!("overlaying settings section {name}");
        flatten_mapping(section, &mut Vec::new(), &mut layer)?;
    }
    for (key, value) in &root {
        let Some(name) = scalar_text(key) else {
            continue;
        };
        if name == COMMON_SECTION || Some(name.as_str()) == environment {
            continue;
        }
        let is_section = matches!(value, Value::Mapping(_) | Value::Null)
            && !names_setting_group(registry, &name);
        if is_section {
            debug!("skipping unselected settings section {name}");
            continue;
        }
        let err = SettingsError::InvalidKey {
            raw: name.clone(),
            message: "root key outside the common and selected sections".to_string(),
        };
        layer.drop_key(name, &err);
    }
    Ok(layer)
}

/// True when `name` is a registered key or the first segment of one.
fn names_setting_group(registry: &KeyRegistry, name: &str) -> bool {
    let Ok(key) = SettingKey::parse(name) else {
        return false;
    };
    registry.contains(&key)
        || registry
            .keys()
            .any(|known| known.segments().next() == Some(key.as_str()))
}

fn flatten_mapping(
    mapping: &Mapping,
    path: &mut Vec<String>,
    layer: &mut LayerValues,
) -> Result<(), SettingsError> {
    for (key, value) in mapping {
        let Some(segment) = scalar_text(key) else {
            return Err(SettingsError::InvalidValue {
                path: display_path(path),
                message: format!("mapping key must be a scalar, found {}", yaml_kind(key)),
            });
        };
        path.push(segment);
        flatten_value(value, path, layer)?;
        path.pop();
    }
    Ok(())
}

fn flatten_value(
    value: &Value,
    path: &mut Vec<String>,
    layer: &mut LayerValues,
) -> Result<(), SettingsError> {
    let leaf = match value {
        Value::Mapping(mapping) => return flatten_mapping(mapping, path, layer),
        Value::Tagged(tagged) => return flatten_value(&tagged.value, path, layer),
        Value::Null => {
            debug!("skipping empty setting {}", display_path(path));
            return Ok(());
        }
        Value::Bool(flag) => SettingValue::Bool(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(int) => SettingValue::Int(int),
            None => SettingValue::Str(number.to_string()),
        },
        Value::String(text) => SettingValue::Str(text.clone()),
        Value::Sequence(items) => {
            let mut list = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                match item {
                    Value::Null => continue,
                    Value::Mapping(_) | Value::Sequence(_) => {
                        return Err(SettingsError::InvalidValue {
                            path: format!("{}[{idx}]", display_path(path)),
                            message: format!(
                                "list items must be scalars, found {}",
                                yaml_kind(item)
                            ),
                        });
                    }
                    scalar => list.extend(scalar_text(scalar)),
                }
            }
            SettingValue::List(list)
        }
    };
    match SettingKey::from_segments(path.iter()) {
        Ok(key) => layer.insert(key, leaf),
        Err(err) => layer.drop_key(display_path(path), &err),
    }
    Ok(())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

fn yaml_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(".")
    }
}
