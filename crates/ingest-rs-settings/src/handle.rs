//! Shared, reloadable access to the effective settings.

use crate::loader::{LayerSummary, Resolution, Resolver};
use crate::{EffectiveConfig, FromSettingValue, SettingsError};
use log::{info, warn};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Owns a resolver and the currently published [`EffectiveConfig`].
///
/// Readers take an `Arc` snapshot and never hold the lock while using it.
/// [`SettingsHandle::reload`] builds a complete new config before swapping it
/// in, so readers see either the old config or the new one.
#[derive(Debug)]
pub struct SettingsHandle {
    resolver: Resolver,
    published: RwLock<Published>,
    reloading: Mutex<()>,
}

#[derive(Debug)]
struct Published {
    config: Arc<EffectiveConfig>,
    layers: Arc<Vec<LayerSummary>>,
}

impl Published {
    fn new(resolution: Resolution) -> Self {
        Self {
            config: Arc::new(resolution.config),
            layers: Arc::new(resolution.layers),
        }
    }
}

impl SettingsHandle {
    /// Resolve once and publish the result.
    pub fn load(resolver: Resolver) -> Result<Self, SettingsError> {
        let resolution = resolver.resolve()?;
        Ok(Self {
            resolver,
            published: RwLock::new(Published::new(resolution)),
            reloading: Mutex::new(()),
        })
    }

    /// The currently published config.
    pub fn snapshot(&self) -> Arc<EffectiveConfig> {
        self.published.read().config.clone()
    }

    /// Layer summaries from the last successful load.
    pub fn layers(&self) -> Arc<Vec<LayerSummary>> {
        self.published.read().layers.clone()
    }

    /// Typed lookup against the current snapshot.
    pub fn get<T: FromSettingValue>(&self, key: &str, default: T) -> Result<T, SettingsError> {
        self.snapshot().get(key, default)
    }

    /// Re-read every layer and publish the new config.
    ///
    /// On failure the previous config stays published and the error is
    /// returned. Concurrent reloads run one at a time, so the last one to
    /// publish is also the last one to read its inputs.
    pub fn reload(&self) -> Result<Arc<EffectiveConfig>, SettingsError> {
        let _reloading = self.reloading.lock();
        let resolution = match self.resolver.resolve() {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!("settings reload failed; keeping previous config: {err}");
                return Err(err);
            }
        };
        let published = Published::new(resolution);
        let config = published.config.clone();
        *self.published.write() = published;
        info!("settings reloaded (keys={})", config.len());
        Ok(config)
    }
}
