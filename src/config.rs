//! Build configuration read once from the process environment
//!
//! Every environment variable the buildpacks consult is read here and
//! nowhere else. Components receive a `&BuildConfig` instead of calling
//! `std::env::var` themselves, which keeps them deterministic under test.

use crate::domain::Runtime;
use crate::error::ConfigError;
use crate::installer::PythonInstaller;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::debug;

/// Runtime name requested by the platform (e.g., `python312`)
pub const ENV_RUNTIME: &str = "GOOGLE_RUNTIME";
/// Version requested for whichever runtime is being built
pub const ENV_RUNTIME_VERSION: &str = "GOOGLE_RUNTIME_VERSION";
pub const ENV_DEBUG: &str = "GOOGLE_DEBUG";
pub const ENV_ENTRYPOINT: &str = "GOOGLE_ENTRYPOINT";
pub const ENV_APP_YAML_PATH: &str = "GAE_APPLICATION_YAML_PATH";
pub const ENV_TARGET_PLATFORM: &str = "X_GOOGLE_TARGET_PLATFORM";
pub const ENV_CUSTOM_NGINX_CONFIG: &str = "GOOGLE_CUSTOM_NGINX_CONFIG";
pub const ENV_COMPOSER_ARGS: &str = "GOOGLE_COMPOSER_ARGS";
pub const ENV_PYTHON_PACKAGE_MANAGER: &str = "GOOGLE_PYTHON_PACKAGE_MANAGER";
pub const ENV_PID1_DIR: &str = "PID1_DIR";
const ENV_USER: &str = "USER";

const FLEX_PLATFORM: &str = "flex";
const DEFAULT_USERNAME: &str = "www-data";

/// Explicit build configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// `GOOGLE_RUNTIME`, lowercased
    pub runtime: Option<String>,
    /// `GOOGLE_RUNTIME_VERSION`
    pub runtime_version: Option<String>,
    /// Language-specific version variables such as `GOOGLE_GO_VERSION`
    pub language_versions: BTreeMap<Runtime, String>,
    /// `GOOGLE_DEBUG`
    pub debug: bool,
    /// `GOOGLE_ENTRYPOINT`
    pub entrypoint: Option<String>,
    /// `GAE_APPLICATION_YAML_PATH`
    pub app_yaml_path: Option<PathBuf>,
    /// `X_GOOGLE_TARGET_PLATFORM`
    pub target_platform: Option<String>,
    /// `GOOGLE_CUSTOM_NGINX_CONFIG`, relative to the application root
    pub custom_nginx_config: Option<String>,
    /// `GOOGLE_COMPOSER_ARGS`
    pub composer_args: Option<String>,
    /// `GOOGLE_PYTHON_PACKAGE_MANAGER`
    pub python_installer: Option<PythonInstaller>,
    /// `PID1_DIR`
    pub pid1_dir: Option<PathBuf>,
    /// Unix user the php-fpm workers run as
    pub username: String,
}

/// Outcome of comparing `GOOGLE_RUNTIME` with the runtime a buildpack serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeOverride {
    /// The platform asked for this runtime
    OptIn,
    /// The platform asked for a different runtime
    OptOut,
}

impl BuildConfig {
    /// Reads the configuration from the current process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Builds the configuration from explicit variables
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let language_versions = Runtime::all()
            .iter()
            .filter_map(|rt| get(rt.version_env()).map(|v| (*rt, v)))
            .collect();

        let debug = match vars.get(ENV_DEBUG) {
            Some(value) => parse_bool(value).ok_or_else(|| ConfigError::InvalidBool {
                var: ENV_DEBUG.to_string(),
                value: value.clone(),
            })?,
            None => false,
        };

        let python_installer = get(ENV_PYTHON_PACKAGE_MANAGER)
            .map(|value| {
                value
                    .parse::<PythonInstaller>()
                    .map_err(|_| ConfigError::UnknownInstaller {
                        var: ENV_PYTHON_PACKAGE_MANAGER.to_string(),
                        value,
                    })
            })
            .transpose()?;

        let config = Self {
            runtime: get(ENV_RUNTIME).map(|v| v.to_ascii_lowercase()),
            runtime_version: get(ENV_RUNTIME_VERSION),
            language_versions,
            debug,
            // Presence matters even when empty
            entrypoint: vars.get(ENV_ENTRYPOINT).cloned(),
            app_yaml_path: get(ENV_APP_YAML_PATH).map(PathBuf::from),
            target_platform: get(ENV_TARGET_PLATFORM),
            custom_nginx_config: vars.get(ENV_CUSTOM_NGINX_CONFIG).cloned(),
            composer_args: get(ENV_COMPOSER_ARGS),
            python_installer,
            pid1_dir: get(ENV_PID1_DIR).map(PathBuf::from),
            username: get(ENV_USER).unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
        };
        debug!(?config, "loaded build configuration");
        Ok(config)
    }

    /// Returns true when building for App Engine flexible
    pub fn is_flex(&self) -> bool {
        self.target_platform
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case(FLEX_PLATFORM))
    }

    /// Returns the version requested through the environment, if any
    ///
    /// The language-specific variable wins over `GOOGLE_RUNTIME_VERSION`.
    pub fn requested_version(&self, runtime: Runtime) -> Option<(&'static str, &str)> {
        if let Some(v) = self.language_versions.get(&runtime) {
            return Some((runtime.version_env(), v.as_str()));
        }
        self.runtime_version
            .as_deref()
            .map(|v| (ENV_RUNTIME_VERSION, v))
    }

    /// Compares `GOOGLE_RUNTIME` with the runtime a buildpack serves
    ///
    /// Returns `None` when the platform did not ask for a runtime. A platform
    /// runtime name such as `python312` opts in the `python` buildpack.
    pub fn runtime_override(&self, runtime: Runtime) -> Option<RuntimeOverride> {
        let requested = self.runtime.as_deref()?;
        if requested.starts_with(runtime.id()) {
            Some(RuntimeOverride::OptIn)
        } else {
            Some(RuntimeOverride::OptOut)
        }
    }
}

/// Parses the boolean spellings accepted for build flags
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
