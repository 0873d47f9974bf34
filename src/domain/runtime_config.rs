//! User overrides declared in the `runtime_config` section of app.yaml

use serde::{Deserialize, Serialize};

/// The parts of app.yaml the buildpacks read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppYaml {
    /// Custom launch command
    #[serde(default)]
    pub entrypoint: Option<String>,
    /// Web server overrides
    #[serde(default)]
    pub runtime_config: RuntimeConfig,
}

/// Optional web server overrides
///
/// Every field is a path relative to the application root, except
/// `front_controller_file` (a script name) and `composer_flags`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub document_root: Option<String>,
    pub front_controller_file: Option<String>,
    /// Replaces the generated nginx configuration entirely
    pub nginx_conf_override: Option<String>,
    /// Included inside the generated server block
    pub nginx_conf_include: Option<String>,
    /// Included inside the generated http block
    pub nginx_conf_http_include: Option<String>,
    /// Replaces the generated php-fpm configuration
    pub php_fpm_conf_override: Option<String>,
    pub php_ini_override: Option<String>,
    pub composer_flags: Option<String>,
    /// Replaces the generated supervisord configuration
    pub supervisord_conf_override: Option<String>,
    /// Extra supervisord programs included by the generated configuration
    pub supervisord_conf_addition: Option<String>,
}

impl RuntimeConfig {
    /// Returns the value when it is set to a non-empty string
    pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}
