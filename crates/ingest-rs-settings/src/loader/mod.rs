//! Layered settings loader.
//!
//! Reads the default, file, system-property, and environment layers, merges
//! them by precedence, and produces an [`EffectiveConfig`] together with a
//! summary of what each layer contributed.

mod bootstrap;
mod defaults;
mod layer_io;
mod merge;
mod process;


pub use bootstrap::{
    CONFIG_FILE_ENV, CONFIG_FILE_PROPERTY, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE,
    ENVIRONMENT_ENV, ENVIRONMENT_PROPERTY,
};
pub use defaults::DefaultReader;
pub use layer_io::FileReader;
pub use process::{EnvSource, EnvironmentReader, PropertyTable, SystemPropertyReader};

use crate::{EffectiveConfig, KeyRegistry, SettingKey, SettingValue, SettingsError, SourceLayer};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A source of raw values for one layer.
///
/// Readers must be idempotent: calling `read` twice against unchanged inputs
/// yields the same values.
pub trait LayerReader: Send + Sync {
    /// The precedence rank of the values this reader produces.
    fn layer(&self) -> SourceLayer;

    /// Read the layer, normalizing keys against `registry`.
    fn read(&self, registry: &KeyRegistry) -> Result<LayerValues, SettingsError>;
}

/// A key skipped while reading a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedKey {
    /// The key as spelled in its source.
    pub raw: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Flat values read from one layer.
#[derive(Debug, Clone)]
pub struct LayerValues {
    /// Layer the values belong to.
    pub layer: SourceLayer,
    /// File the values were read from, if any.
    pub origin: Option<PathBuf>,
    /// Values keyed by canonical key.
    pub values: BTreeMap<SettingKey, SettingValue>,
    /// Keys that were skipped.
    pub dropped: Vec<DroppedKey>,
}

impl LayerValues {
    /// An empty layer.
    pub fn empty(layer: SourceLayer) -> Self {
        Self {
            layer,
            origin: None,
            values: BTreeMap::new(),
            dropped: Vec::new(),
        }
    }

    /// Insert a value, replacing any earlier value for the same key.
    pub fn insert(&mut self, key: SettingKey, value: impl Into<SettingValue>) {
        self.values.insert(key, value.into());
    }

    /// Record a skipped key and log it.
    pub(crate) fn drop_key(&mut self, raw: impl Into<String>, err: &SettingsError) {
        let raw = raw.into();
        warn!(
            "dropping {} key {} (reason={})",
            self.layer.label(),
            raw,
            err
        );
        self.dropped.push(DroppedKey {
            raw,
            reason: err.to_string(),
        });
    }
}

/// Metadata about one layer considered during a load.
#[derive(Debug, Clone)]
pub struct LayerSummary {
    /// Layer rank.
    pub source: SourceLayer,
    /// File location for the file layer, when one was read.
    pub path: Option<PathBuf>,
    /// Number of values the layer contributed before merging.
    pub entries: usize,
    /// Keys the layer skipped.
    pub dropped: Vec<DroppedKey>,
}

/// Effective config plus metadata about the layers it was built from.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The merged settings.
    pub config: EffectiveConfig,
    /// One summary per layer, in read order.
    pub layers: Vec<LayerSummary>,
}

/// Options controlling which layers are read and where from.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// File that must exist; takes priority over `search_paths`.
    pub config_file: Option<PathBuf>,
    /// Optional file locations probed in order when no file is named.
    pub search_paths: Vec<PathBuf>,
    /// YAML environment section overlaid onto `common`.
    pub environment: Option<String>,
    /// Process property table.
    pub properties: PropertyTable,
    /// Where environment variables are read from.
    pub env: EnvSource,
    /// Known keys used to resolve environment names.
    pub registry: KeyRegistry,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverOptions {
    /// Options with no file, an empty property table, and the live process
    /// environment.
    pub fn new() -> Self {
        Self {
            config_file: None,
            search_paths: Vec::new(),
            environment: None,
            properties: PropertyTable::new(),
            env: EnvSource::Process,
            registry: KeyRegistry::builtin(),
        }
    }

    /// Options with default search paths for `cwd` and bootstrap variables
    /// applied.
    ///
    /// Searches `<cwd>/newrelic.yml` then `~/.newrelic/newrelic.yml`, and
    /// honors `NEW_RELIC_CONFIG_FILE` / `newrelic.config.file` and
    /// `NEW_RELIC_ENVIRONMENT` / `newrelic.environment` when the caller has
    /// not already chosen a file or section.
    pub fn discover(cwd: impl AsRef<Path>, properties: PropertyTable, env: EnvSource) -> Self {
        let mut options = Self::new();
        options.properties = properties;
        options.env = env;
        options.search_paths = bootstrap::default_search_paths(cwd.as_ref());
        bootstrap::apply_bootstrap(&mut options);
        options
    }

    /// Require a specific settings file.
    pub fn with_config_file(mut self, path: impl AsRef<Path>) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Select the YAML environment section.
    pub fn with_environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    /// Replace the property table.
    pub fn with_properties(mut self, properties: PropertyTable) -> Self {
        self.properties = properties;
        self
    }

    /// Replace the environment source.
    pub fn with_env(mut self, env: EnvSource) -> Self {
        self.env = env;
        self
    }
}

/// Reads every layer and merges them into an [`EffectiveConfig`].
pub struct Resolver {
    registry: KeyRegistry,
    readers: Vec<Box<dyn LayerReader>>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("registry", &self.registry)
            .field(
                "layers",
                &self.readers.iter().map(|r| r.layer()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Resolver {
    /// Build the standard four-layer resolver from options.
    pub fn new(options: ResolverOptions) -> Self {
        let ResolverOptions {
            config_file,
            search_paths,
            environment,
            properties,
            env,
            registry,
        } = options;
        let file = FileReader::new(config_file, search_paths, environment);
        Self::with_readers(
            registry,
            vec![
                Box::new(DefaultReader),
                Box::new(file),
                Box::new(SystemPropertyReader::new(properties)),
                Box::new(EnvironmentReader::new(env)),
            ],
        )
    }

    /// Build a resolver from explicit readers.
    pub fn with_readers(registry: KeyRegistry, readers: Vec<Box<dyn LayerReader>>) -> Self {
        Self { registry, readers }
    }

    /// Read all layers and merge them.
    ///
    /// Fails on the first construction error; no partial config is returned.
    pub fn resolve(&self) -> Result<Resolution, SettingsError> {
        let mut layers = Vec::with_capacity(self.readers.len());
        let mut summaries = Vec::with_capacity(self.readers.len());
        for reader in &self.readers {
            let values = reader.read(&self.registry)?;
            debug!(
                "read {} layer (entries={}, dropped={})",
                values.layer.label(),
                values.values.len(),
                values.dropped.len()
            );
            summaries.push(LayerSummary {
                source: values.layer,
                path: values.origin.clone(),
                entries: values.values.len(),
                dropped: values.dropped.clone(),
            });
            layers.push(values);
        }
        let config = EffectiveConfig::from_entries(merge::merge_layers(layers));
        info!(
            "settings resolved (layers={}, keys={})",
            summaries.len(),
            config.len()
        );
        Ok(Resolution {
            config,
            layers: summaries,
        })
    }
}
