//! Locating the settings file and its environment section.

use super::ResolverOptions;
use directories::UserDirs;
use log::debug;
use std::path::{Path, PathBuf};

/// Default settings filename.
pub const DEFAULT_CONFIG_FILE: &str = "newrelic.yml";
/// Settings directory under the home directory.
pub const DEFAULT_CONFIG_DIR: &str = ".newrelic";
/// Environment variable naming the settings file.
pub const CONFIG_FILE_ENV: &str = "NEW_RELIC_CONFIG_FILE";
/// Property naming the settings file.
pub const CONFIG_FILE_PROPERTY: &str = "newrelic.config.file";
/// Environment variable selecting the YAML environment section.
pub const ENVIRONMENT_ENV: &str = "NEW_RELIC_ENVIRONMENT";
/// Property selecting the YAML environment section.
pub const ENVIRONMENT_PROPERTY: &str = "newrelic.environment";

/// Candidate file locations for `cwd`, in probe order.
pub(super) fn default_search_paths(cwd: &Path) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(DEFAULT_CONFIG_FILE)];
    if let Some(dirs) = UserDirs::new() {
        paths.push(dirs.home_dir().join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILE));
    }
    paths
}

/// Fill in the file and section from bootstrap variables.
///
/// Values already set on `options` win; otherwise the environment variable
/// wins over the property, matching layer precedence.
pub(super) fn apply_bootstrap(options: &mut ResolverOptions) {
    if options.config_file.is_none() {
        let chosen = bootstrap_value(options, CONFIG_FILE_ENV, CONFIG_FILE_PROPERTY);
        if let Some(path) = chosen {
            debug!("settings file selected by bootstrap variable (path={path})");
            options.config_file = Some(PathBuf::from(path));
        }
    }
    if options.environment.is_none() {
        let chosen = bootstrap_value(options, ENVIRONMENT_ENV, ENVIRONMENT_PROPERTY);
        if let Some(name) = chosen {
            debug!("settings section selected by bootstrap variable (section={name})");
            options.environment = Some(name);
        }
    }
}

fn bootstrap_value(options: &ResolverOptions, env_name: &str, property: &str) -> Option<String> {
    options
        .env
        .get(env_name)
        .or_else(|| options.properties.get(property).map(str::to_string))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
