//! Web server configuration rendering
//!
//! Renders nginx, php-fpm and supervisord configuration from a closed set of
//! templates. A user override for a template short-circuits rendering: the
//! override path is returned unchanged and nothing is generated.

mod web_config;

pub use web_config::{
    supports_decorate_workers_output, workspace_path, EnvScope, EnvVar, Overrides, WebConfig,
    DEFAULT_FRONT_CONTROLLER, DEFAULT_NUM_WORKERS, DEFAULT_PORT, FLEX_FPM_ADDRESS,
    MIME_TYPES_PATH, NGINX_CONF, NGINX_SERVER_CONF, PHP_FPM_CONF, SUPERVISORD_CONF,
    WORKSPACE_ROOT,
};

use crate::error::RenderError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tera::{Context, Tera};
use tracing::debug;

/// The templates the renderer knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    /// nginx server block forwarding to php-fpm
    NginxServer,
    /// Main nginx.conf with the FastCGI upstream
    NginxHttpUpstream,
    /// php-fpm pool
    PhpFpmPool,
    /// supervisord running php-fpm and nginx
    SupervisorMain,
}

impl TemplateId {
    pub fn all() -> &'static [TemplateId] {
        &[
            TemplateId::NginxServer,
            TemplateId::NginxHttpUpstream,
            TemplateId::PhpFpmPool,
            TemplateId::SupervisorMain,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            TemplateId::NginxServer => "nginx-server",
            TemplateId::NginxHttpUpstream => "nginx-http-upstream",
            TemplateId::PhpFpmPool => "php-fpm-pool",
            TemplateId::SupervisorMain => "supervisor-main",
        }
    }

    /// File name the rendered output is written to
    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateId::NginxServer => NGINX_SERVER_CONF,
            TemplateId::NginxHttpUpstream => NGINX_CONF,
            TemplateId::PhpFpmPool => PHP_FPM_CONF,
            TemplateId::SupervisorMain => SUPERVISORD_CONF,
        }
    }

    // Names end in .conf so the engine never autoescapes
    fn engine_name(&self) -> String {
        format!("{}.conf", self.id())
    }

    fn source(&self) -> &'static str {
        match self {
            TemplateId::NginxServer => include_str!("../../templates/nginx-server.conf.tera"),
            TemplateId::NginxHttpUpstream => {
                include_str!("../../templates/nginx-http-upstream.conf.tera")
            }
            TemplateId::PhpFpmPool => include_str!("../../templates/php-fpm-pool.conf.tera"),
            TemplateId::SupervisorMain => include_str!("../../templates/supervisor-main.conf.tera"),
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for TemplateId {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::all()
            .iter()
            .copied()
            .find(|t| t.id() == s)
            .ok_or_else(|| RenderError::UnknownTemplate {
                name: s.to_string(),
                expected: TemplateId::all()
                    .iter()
                    .map(|t| t.id())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Outcome of rendering a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedConfig {
    /// Text produced from the template
    Generated { text: String },
    /// A user file replaces the template; its path is passed through
    Override { path: String },
}

impl RenderedConfig {
    /// The generated text, or the override path
    pub fn text(&self) -> &str {
        match self {
            RenderedConfig::Generated { text } => text,
            RenderedConfig::Override { path } => path,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, RenderedConfig::Override { .. })
    }

    /// Writes generated text to `path` and returns the path the consumer should read
    ///
    /// Overrides are not copied; their own path is returned.
    pub fn write_to(&self, path: &Path) -> Result<PathBuf, RenderError> {
        match self {
            RenderedConfig::Generated { text } => {
                std::fs::write(path, text).map_err(|e| RenderError::WriteError {
                    path: path.to_path_buf(),
                    source: e,
                })?;
                Ok(path.to_path_buf())
            }
            RenderedConfig::Override { path } => Ok(PathBuf::from(path)),
        }
    }
}

/// Template renderer
pub struct ConfigRenderer {
    tera: Tera,
}

impl ConfigRenderer {
    /// Creates a renderer with every template loaded
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        for template in TemplateId::all() {
            tera.add_raw_template(&template.engine_name(), template.source())
                .map_err(|e| RenderError::Template {
                    template: template.id().to_string(),
                    message: describe(&e),
                })?;
        }
        Ok(Self { tera })
    }

    /// Renders a template, or passes through the user override for it
    ///
    /// Rendering is deterministic: the same config always yields the same text.
    pub fn render(
        &self,
        template: TemplateId,
        config: &WebConfig,
    ) -> Result<RenderedConfig, RenderError> {
        if let Some(path) = config.override_for(template) {
            debug!(template = template.id(), path, "using override");
            return Ok(RenderedConfig::Override {
                path: path.to_string(),
            });
        }

        let to_error = |e: tera::Error| RenderError::Template {
            template: template.id().to_string(),
            message: describe(&e),
        };
        let context = Context::from_serialize(config.context()).map_err(to_error)?;
        let text = self
            .tera
            .render(&template.engine_name(), &context)
            .map_err(to_error)?;

        debug!(template = template.id(), bytes = text.len(), "rendered");
        Ok(RenderedConfig::Generated { text })
    }
}

/// Flattens a tera error and its causes into one line
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
