//! Typed inputs for the web server templates
//!
//! [`Overrides`] collects user-supplied files and settings from app.yaml and
//! the environment. [`WebConfig`] combines them with the layer layout and
//! derives every address and path the templates reference.

use crate::config::{BuildConfig, ENV_COMPOSER_ARGS};
use crate::domain::{is_release_candidate, RuntimeConfig};
use crate::error::VersionError;
use crate::render::TemplateId;
use crate::resolver::version_matches;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Application root inside the build and launch images
pub const WORKSPACE_ROOT: &str = "/workspace";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_FRONT_CONTROLLER: &str = "index.php";
pub const DEFAULT_NUM_WORKERS: u32 = 2;
/// php-fpm listens on TCP instead of a socket on flex
pub const FLEX_FPM_ADDRESS: &str = "127.0.0.1:9000";
pub const MIME_TYPES_PATH: &str = "/layers/google.utils.nginx/nginx/conf/mime.types";

pub const NGINX_CONF: &str = "nginx.conf";
pub const NGINX_SERVER_CONF: &str = "nginx-server.conf";
pub const PHP_FPM_CONF: &str = "php-fpm.conf";
pub const SUPERVISORD_CONF: &str = "supervisord.conf";
const APP_SOCKET: &str = "app.sock";
const PHP_FPM_PID: &str = "php-fpm.pid";
const NGINX_PID: &str = "nginx.pid";

// Files picked up from the application root without explicit configuration
const DEFAULT_NGINX_OVERRIDE: &str = "nginx.conf";
const DEFAULT_NGINX_SERVER_INCLUDE: &str = "nginx-app.conf";
const DEFAULT_NGINX_HTTP_INCLUDE: &str = "nginx-http.conf";
const DEFAULT_PHP_FPM_OVERRIDE: &str = "php-fpm.conf";
const DEFAULT_PHP_INI_OVERRIDE: &str = "php.ini";
const DEFAULT_SUPERVISORD_OVERRIDE: &str = "supervisord.conf";
const DEFAULT_SUPERVISORD_ADDITION: &str = "additional-supervisord.conf";

const ENV_PHPRC: &str = "PHPRC";
/// First PHP release that understands `decorate_workers_output`
const DECORATE_WORKERS_RANGE: &str = ">=7.3.0";

/// Joins a path relative to the application root onto [`WORKSPACE_ROOT`]
pub fn workspace_path(relative: &str) -> String {
    Path::new(WORKSPACE_ROOT)
        .join(relative.trim_start_matches('/'))
        .display()
        .to_string()
}

/// User-supplied replacements and additions for the generated configuration
///
/// File paths are absolute, already joined onto [`WORKSPACE_ROOT`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overrides {
    pub document_root: Option<String>,
    pub front_controller: Option<String>,
    pub nginx_conf: Option<String>,
    pub nginx_server_include: Option<String>,
    pub nginx_http_include: Option<String>,
    pub php_fpm_conf: Option<String>,
    pub php_ini: Option<String>,
    pub composer_flags: Option<String>,
    pub supervisord_conf: Option<String>,
    pub supervisord_addition: Option<String>,
}

/// Which phase an environment variable is exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvScope {
    Build,
    Launch,
}

/// An environment variable the overrides ask to export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVar {
    pub scope: EnvScope,
    pub name: String,
    pub value: String,
}

impl Overrides {
    /// Collects overrides for an application
    ///
    /// app.yaml settings and default files in `app_dir` only apply on flex.
    /// `GOOGLE_CUSTOM_NGINX_CONFIG` replaces the nginx configuration everywhere.
    pub fn resolve(runtime_config: &RuntimeConfig, app_dir: &Path, build: &BuildConfig) -> Self {
        let mut overrides = if build.is_flex() {
            Self::from_runtime_config(runtime_config, app_dir)
        } else {
            Self::default()
        };

        if let Some(custom) = build.custom_nginx_config.as_deref() {
            overrides.nginx_conf = Some(workspace_path(custom.trim()));
        }

        overrides
    }

    /// Collects overrides from app.yaml, falling back to well-known files in `app_dir`
    pub fn from_runtime_config(rc: &RuntimeConfig, app_dir: &Path) -> Self {
        let file = |configured: &Option<String>, default: &str| -> Option<String> {
            match RuntimeConfig::non_empty(configured) {
                Some(value) => Some(workspace_path(value)),
                None if app_dir.join(default).is_file() => Some(workspace_path(default)),
                None => None,
            }
        };

        Self {
            document_root: RuntimeConfig::non_empty(&rc.document_root).map(str::to_string),
            front_controller: RuntimeConfig::non_empty(&rc.front_controller_file)
                .map(str::to_string),
            nginx_conf: file(&rc.nginx_conf_override, DEFAULT_NGINX_OVERRIDE),
            nginx_server_include: file(&rc.nginx_conf_include, DEFAULT_NGINX_SERVER_INCLUDE),
            nginx_http_include: file(&rc.nginx_conf_http_include, DEFAULT_NGINX_HTTP_INCLUDE),
            php_fpm_conf: file(&rc.php_fpm_conf_override, DEFAULT_PHP_FPM_OVERRIDE),
            php_ini: file(&rc.php_ini_override, DEFAULT_PHP_INI_OVERRIDE),
            composer_flags: RuntimeConfig::non_empty(&rc.composer_flags).map(str::to_string),
            supervisord_conf: file(&rc.supervisord_conf_override, DEFAULT_SUPERVISORD_OVERRIDE),
            supervisord_addition: file(&rc.supervisord_conf_addition, DEFAULT_SUPERVISORD_ADDITION),
        }
    }

    /// Environment variables implied by the overrides
    pub fn environment(&self) -> Vec<EnvVar> {
        let mut vars = Vec::new();
        if let Some(flags) = &self.composer_flags {
            vars.push(EnvVar {
                scope: EnvScope::Build,
                name: ENV_COMPOSER_ARGS.to_string(),
                value: flags.clone(),
            });
        }
        if let Some(ini) = &self.php_ini {
            vars.push(EnvVar {
                scope: EnvScope::Launch,
                name: ENV_PHPRC.to_string(),
                value: ini.clone(),
            });
        }
        vars
    }
}

/// Returns true if php-fpm accepts `decorate_workers_output` for a PHP version
pub fn supports_decorate_workers_output(php_version: &str) -> Result<bool, VersionError> {
    if is_release_candidate(php_version) {
        return Ok(true);
    }
    version_matches(DECORATE_WORKERS_RANGE, php_version)
}

/// Configuration record the templates are rendered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    /// Layer the generated files, sockets and pid files live in
    pub layer_dir: PathBuf,
    pub flex: bool,
    pub port: u16,
    pub num_workers: u32,
    /// Use a dynamic php-fpm pool instead of a static one
    pub dynamic_workers: bool,
    pub username: String,
    pub add_no_decorate_workers: bool,
    pub overrides: Overrides,
}

/// Flattened view handed to the template engine
#[derive(Debug, Serialize)]
pub(crate) struct TemplateContext {
    port: u16,
    root: String,
    front_controller: String,
    listen_address: String,
    upstream_address: String,
    num_workers: u32,
    dynamic_workers: bool,
    pid_path: String,
    nginx_pid_path: String,
    username: String,
    add_no_decorate_workers: bool,
    nginx_conf_include: Option<String>,
    nginx_http_include: Option<String>,
    server_conf_path: String,
    php_fpm_conf_path: String,
    nginx_conf_path: String,
    supervisor_include: Option<String>,
    mime_types_path: &'static str,
}

impl WebConfig {
    /// Defaults for a layer: port 8080, two static workers, socket transport
    pub fn new(layer_dir: impl Into<PathBuf>) -> Self {
        Self {
            layer_dir: layer_dir.into(),
            flex: false,
            port: DEFAULT_PORT,
            num_workers: DEFAULT_NUM_WORKERS,
            dynamic_workers: false,
            username: "www-data".to_string(),
            add_no_decorate_workers: false,
            overrides: Overrides::default(),
        }
    }

    /// Defaults adjusted to the build configuration
    pub fn from_build(build: &BuildConfig, layer_dir: impl Into<PathBuf>, overrides: Overrides) -> Self {
        Self {
            flex: build.is_flex(),
            username: build.username.clone(),
            overrides,
            ..Self::new(layer_dir)
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_workers(mut self, num_workers: u32, dynamic: bool) -> Self {
        self.num_workers = num_workers;
        self.dynamic_workers = dynamic;
        self
    }

    pub fn with_no_decorate_workers(mut self, enabled: bool) -> Self {
        self.add_no_decorate_workers = enabled;
        self
    }

    fn layer_path(&self, name: &str) -> String {
        self.layer_dir.join(name).display().to_string()
    }

    /// Unix socket php-fpm listens on off flex
    pub fn socket_path(&self) -> String {
        self.layer_path(APP_SOCKET)
    }

    pub fn root(&self) -> String {
        match &self.overrides.document_root {
            Some(document_root) => workspace_path(document_root),
            None => WORKSPACE_ROOT.to_string(),
        }
    }

    pub fn front_controller(&self) -> &str {
        self.overrides
            .front_controller
            .as_deref()
            .unwrap_or(DEFAULT_FRONT_CONTROLLER)
    }

    /// Address php-fpm accepts FastCGI requests on
    pub fn listen_address(&self) -> String {
        if self.flex {
            FLEX_FPM_ADDRESS.to_string()
        } else {
            self.socket_path()
        }
    }

    /// Address nginx forwards FastCGI requests to
    pub fn upstream_address(&self) -> String {
        if self.flex {
            FLEX_FPM_ADDRESS.to_string()
        } else {
            format!("unix:{}", self.socket_path())
        }
    }

    /// Where the main nginx configuration is read from at launch
    pub fn nginx_conf_path(&self) -> String {
        self.overrides
            .nginx_conf
            .clone()
            .unwrap_or_else(|| self.layer_path(NGINX_CONF))
    }

    pub fn server_conf_path(&self) -> String {
        self.layer_path(NGINX_SERVER_CONF)
    }

    /// Where the php-fpm configuration is read from at launch
    pub fn php_fpm_conf_path(&self) -> String {
        self.overrides
            .php_fpm_conf
            .clone()
            .unwrap_or_else(|| self.layer_path(PHP_FPM_CONF))
    }

    pub fn supervisord_conf_path(&self) -> String {
        self.overrides
            .supervisord_conf
            .clone()
            .unwrap_or_else(|| self.layer_path(SUPERVISORD_CONF))
    }

    /// The user file replacing a template's output, if any
    pub fn override_for(&self, template: TemplateId) -> Option<&str> {
        match template {
            TemplateId::NginxServer | TemplateId::NginxHttpUpstream => {
                self.overrides.nginx_conf.as_deref()
            }
            TemplateId::PhpFpmPool => self.overrides.php_fpm_conf.as_deref(),
            TemplateId::SupervisorMain => self.overrides.supervisord_conf.as_deref(),
        }
    }

    pub(crate) fn context(&self) -> TemplateContext {
        TemplateContext {
            port: self.port,
            root: self.root(),
            front_controller: self.front_controller().to_string(),
            listen_address: self.listen_address(),
            upstream_address: self.upstream_address(),
            num_workers: self.num_workers,
            dynamic_workers: self.dynamic_workers,
            pid_path: self.layer_path(PHP_FPM_PID),
            nginx_pid_path: self.layer_path(NGINX_PID),
            username: self.username.clone(),
            add_no_decorate_workers: self.add_no_decorate_workers,
            nginx_conf_include: self.overrides.nginx_server_include.clone(),
            nginx_http_include: self.overrides.nginx_http_include.clone(),
            server_conf_path: self.server_conf_path(),
            php_fpm_conf_path: self.php_fpm_conf_path(),
            nginx_conf_path: self.nginx_conf_path(),
            supervisor_include: self.overrides.supervisord_addition.clone(),
            mime_types_path: MIME_TYPES_PATH,
        }
    }
}
