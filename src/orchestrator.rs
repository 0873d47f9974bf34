//! Workflow coordination for the bpkit commands
//!
//! This module provides:
//! - Version resolution: discover → fetch index → resolve
//! - PHP web configuration: overrides → render → write → launch process
//! - Python dependency installation plans

use crate::config::BuildConfig;
use crate::domain::{AvailableVersionSet, Runtime, VersionSpec};
use crate::error::AppError;
use crate::installer::{
    run_all_with, supervisor_install_command, CommandRunner, InstallCommand, InstallResult,
    PythonInstaller,
};
use crate::launch::{web_process, LaunchProcess, ProcessManager};
use crate::manifest::{load_app_yaml, runtime_config_from_env};
use crate::progress::Progress;
use crate::registry::{create_index, load_index_file, HttpClient, JsonRecordIndex, VersionIndex};
use crate::render::{
    supports_decorate_workers_output, ConfigRenderer, EnvVar, Overrides, RenderedConfig,
    TemplateId, WebConfig,
};
use crate::resolver::{discover_version, RequestedVersion, ResolvedVersion, VersionOrigin, VersionResolver};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where the available versions are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSource {
    /// The index the runtime publishes
    Published,
    /// A `{version, stable}` JSON index at a URL
    Url(String),
    /// A local JSON index file
    File(PathBuf),
}

/// Input of a version resolution
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub runtime: Runtime,
    /// Explicit constraint; discovered from the environment and manifests when absent
    pub constraint: Option<String>,
    pub app_dir: PathBuf,
    pub index: IndexSource,
    /// Return `MAJOR.MINOR.PATCH` instead of the published string
    pub sanitize: bool,
}

/// Result of a version resolution
#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutcome {
    pub runtime: Runtime,
    pub requested: RequestedVersion,
    pub resolved: ResolvedVersion,
}

/// Input of the web configuration workflow
#[derive(Debug, Clone)]
pub struct WebConfigRequest {
    pub app_dir: PathBuf,
    pub layer_dir: PathBuf,
    /// app.yaml to read overrides from; falls back to `GAE_APPLICATION_YAML_PATH`
    pub app_yaml: Option<PathBuf>,
    /// Resolved PHP version, used for feature gates
    pub php_version: Option<String>,
    pub workers: Option<u32>,
    pub dynamic_workers: bool,
}

/// A configuration file consumed at launch
#[derive(Debug, Clone, Serialize)]
pub struct ConfigFile {
    pub template: String,
    pub path: PathBuf,
    /// The file is a user override rather than generated
    pub overridden: bool,
}

/// Result of the web configuration workflow
#[derive(Debug, Clone, Serialize)]
pub struct WebConfigOutcome {
    pub files: Vec<ConfigFile>,
    pub environment: Vec<EnvVar>,
    /// Commands the build must run before launch
    pub setup: Vec<InstallCommand>,
    pub process: Option<LaunchProcess>,
}

/// Result of a Python dependency installation
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub installer: PythonInstaller,
    pub commands: Vec<InstallCommand>,
    /// Empty on a dry run
    pub results: Vec<InstallResult>,
    pub dry_run: bool,
}

impl InstallReport {
    /// True when every executed command succeeded
    pub fn succeeded(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }
}

/// Orchestrator for the bpkit workflows
pub struct Orchestrator {
    /// Build configuration read once from the environment
    build: BuildConfig,
    /// HTTP client for index requests
    client: HttpClient,
    show_progress: bool,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(build: BuildConfig, show_progress: bool) -> Result<Self, AppError> {
        let client = HttpClient::new()?;
        Ok(Self::with_client(build, client, show_progress))
    }

    /// Create an orchestrator with a custom HTTP client (for testing)
    pub fn with_client(build: BuildConfig, client: HttpClient, show_progress: bool) -> Self {
        Self {
            build,
            client,
            show_progress,
        }
    }

    pub fn build_config(&self) -> &BuildConfig {
        &self.build
    }

    /// Resolve the version to install for a runtime
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<ResolveOutcome, AppError> {
        let requested = match &request.constraint {
            Some(constraint) => RequestedVersion::new(constraint.clone(), VersionOrigin::Argument),
            None => discover_version(request.runtime, &self.build, &request.app_dir)?,
        };

        let spec = VersionSpec::parse(&requested.value)?;
        let resolver = if request.sanitize {
            VersionResolver::sanitized()
        } else {
            VersionResolver::new()
        };

        let available = if spec.is_exact() {
            debug!(spec = %spec, "exact request, skipping index");
            AvailableVersionSet::default()
        } else {
            self.fetch_index(request.runtime, &request.index).await?
        };

        let resolved = resolver.resolve(&spec, &available)?;
        info!(
            "Resolved {} {} to {}",
            request.runtime.display_name(),
            spec,
            resolved.version
        );

        Ok(ResolveOutcome {
            runtime: request.runtime,
            requested,
            resolved,
        })
    }

    /// Fetch available versions with a spinner
    async fn fetch_index(
        &self,
        runtime: Runtime,
        source: &IndexSource,
    ) -> Result<AvailableVersionSet, AppError> {
        let index: Box<dyn VersionIndex> = match source {
            IndexSource::File(path) => return Ok(load_index_file(path)?),
            IndexSource::Url(url) => Box::new(JsonRecordIndex::new(self.client.clone(), url)),
            IndexSource::Published => create_index(runtime, self.client.clone()),
        };

        let mut progress = Progress::new(self.show_progress);
        progress.spinner(&format!("Fetching {} versions...", runtime.display_name()));
        let result = index.fetch().await;
        progress.finish_and_clear();

        let available = result?;
        debug!(source = available.source(), count = available.len(), "fetched index");
        Ok(available)
    }

    /// Build the web configuration record for an application
    pub fn web_config(&self, request: &WebConfigRequest) -> Result<WebConfig, AppError> {
        let runtime_config = match &request.app_yaml {
            Some(path) => load_app_yaml(path)?.runtime_config,
            None => runtime_config_from_env(&self.build)?,
        };
        let overrides = Overrides::resolve(&runtime_config, &request.app_dir, &self.build);

        let no_decorate = match &request.php_version {
            Some(version) => supports_decorate_workers_output(version)?,
            None => false,
        };

        let config = WebConfig::from_build(&self.build, &request.layer_dir, overrides)
            .with_no_decorate_workers(no_decorate);
        let workers = request.workers.unwrap_or(config.num_workers);
        Ok(config.with_workers(workers, request.dynamic_workers))
    }

    /// Render every configuration file into the layer and build the launch process
    pub fn write_web_config(&self, request: &WebConfigRequest) -> Result<WebConfigOutcome, AppError> {
        let config = self.web_config(request)?;
        let renderer = ConfigRenderer::new()?;
        let manager = ProcessManager::select(&config);

        std::fs::create_dir_all(&request.layer_dir)
            .map_err(|e| AppError::io(&request.layer_dir, e))?;

        let mut templates = vec![
            TemplateId::PhpFpmPool,
            TemplateId::NginxServer,
            TemplateId::NginxHttpUpstream,
        ];
        let mut setup = Vec::new();
        if manager == ProcessManager::Supervisord {
            templates.push(TemplateId::SupervisorMain);
            setup.push(supervisor_install_command(&request.layer_dir));
        }

        let mut files = Vec::new();
        for template in templates {
            let rendered = renderer.render(template, &config)?;
            let path = rendered.write_to(&request.layer_dir.join(template.file_name()))?;
            debug!(template = template.id(), path = %path.display(), "config ready");
            files.push(ConfigFile {
                template: template.id().to_string(),
                path,
                overridden: rendered.is_override(),
            });
        }

        Ok(WebConfigOutcome {
            files,
            environment: config.overrides.environment(),
            setup,
            process: web_process(&self.build, &request.app_dir, &config),
        })
    }

    /// Render a single template
    pub fn render(
        &self,
        template: TemplateId,
        request: &WebConfigRequest,
    ) -> Result<RenderedConfig, AppError> {
        let config = self.web_config(request)?;
        Ok(ConfigRenderer::new()?.render(template, &config)?)
    }

    /// Plan the Python dependency installation for an application
    pub fn python_install_plan(
        &self,
        app_dir: &Path,
        layer: &Path,
        python_version: &str,
    ) -> Result<(PythonInstaller, Vec<InstallCommand>), AppError> {
        let installer = PythonInstaller::select(&self.build, app_dir);
        info!("Installing Python dependencies with {}", installer);
        let commands = installer.plan(app_dir, layer, python_version)?;
        Ok((installer, commands))
    }

    /// Plan and, unless `dry_run`, run the Python dependency installation
    pub fn python_install(
        &self,
        app_dir: &Path,
        layer: &Path,
        python_version: &str,
        runner: &dyn CommandRunner,
        dry_run: bool,
    ) -> Result<InstallReport, AppError> {
        let (installer, commands) = self.python_install_plan(app_dir, layer, python_version)?;
        let results = if dry_run {
            Vec::new()
        } else {
            self.run_install(runner, &commands, app_dir)
        };
        Ok(InstallReport {
            installer,
            commands,
            results,
            dry_run,
        })
    }

    /// Run an installation plan, stopping at the first failure
    pub fn run_install(
        &self,
        runner: &dyn CommandRunner,
        commands: &[InstallCommand],
        app_dir: &Path,
    ) -> Vec<InstallResult> {
        let mut progress = Progress::new(self.show_progress);
        progress.start(commands.len() as u64, "Installing dependencies");
        let results = run_all_with(runner, commands, app_dir, |_| progress.inc());
        progress.finish_and_clear();
        results
    }
}
