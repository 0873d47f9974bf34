//! app.yaml loader
//!
//! The file is only consulted when `GAE_APPLICATION_YAML_PATH` points at it.
//! A configured path that does not exist is an error.

use crate::config::BuildConfig;
use crate::domain::{AppYaml, RuntimeConfig};
use crate::error::ManifestError;
use std::path::Path;
use tracing::debug;

/// Loads an app.yaml file
pub fn load_app_yaml(path: &Path) -> Result<AppYaml, ManifestError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))?;

    if content.trim().is_empty() {
        return Ok(AppYaml::default());
    }

    let app: AppYaml = serde_yaml::from_str(&content)
        .map_err(|e| ManifestError::yaml_parse_error(path, e.to_string()))?;
    debug!(path = %path.display(), runtime_config = ?app.runtime_config, "loaded app.yaml");
    Ok(app)
}

/// Returns the runtime_config section of the app.yaml named by the build configuration
pub fn runtime_config_from_env(config: &BuildConfig) -> Result<RuntimeConfig, ManifestError> {
    match &config.app_yaml_path {
        Some(path) => Ok(load_app_yaml(path)?.runtime_config),
        None => Ok(RuntimeConfig::default()),
    }
}
