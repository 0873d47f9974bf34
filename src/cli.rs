//! CLI argument parsing module for bpkit

use crate::domain::Runtime;
use crate::manifest::ManifestKind;
use crate::orchestrator::{IndexSource, ResolveRequest, WebConfigRequest};
use crate::render::TemplateId;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable holding the default log filter
pub const LOG_LEVEL_ENV: &str = "BPKIT_LOG_LEVEL";

/// Runtime version resolution and web server configuration for buildpacks
#[derive(Parser, Debug, Clone)]
#[command(name = "bpkit", version, about = "Buildpack runtime versions and web server configuration")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log level (overrides --verbose, --quiet and BPKIT_LOG_LEVEL)
    #[arg(
        long,
        global = true,
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    pub log_level: Option<String>,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resolve the runtime version to install
    Resolve(ResolveArgs),
    /// Print the version a manifest file declares
    ManifestVersion(ManifestVersionArgs),
    /// Render a single web server configuration template
    Render(RenderArgs),
    /// Write the PHP web server configuration and print the launch process
    Webconfig(WebOptions),
    /// Install Python dependencies with the selected package manager
    PythonInstall(PythonInstallArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Runtime to resolve (go, nodejs, php, python, ruby)
    pub runtime: Runtime,

    /// Version or constraint; discovered from the environment and manifests when omitted
    #[arg(long)]
    pub constraint: Option<String>,

    /// Read available versions from a local JSON file
    #[arg(long, conflicts_with = "index_url")]
    pub index_file: Option<PathBuf>,

    /// Read available versions from a `{version, stable}` JSON index
    #[arg(long)]
    pub index_url: Option<String>,

    /// Application root holding the manifests
    #[arg(long, default_value = ".")]
    pub app_dir: PathBuf,

    /// Print MAJOR.MINOR.PATCH instead of the published version string
    #[arg(long)]
    pub sanitize: bool,
}

impl ResolveArgs {
    pub fn index_source(&self) -> IndexSource {
        match (&self.index_file, &self.index_url) {
            (Some(path), _) => IndexSource::File(path.clone()),
            (None, Some(url)) => IndexSource::Url(url.clone()),
            (None, None) => IndexSource::Published,
        }
    }

    pub fn to_request(&self) -> ResolveRequest {
        ResolveRequest {
            runtime: self.runtime,
            constraint: self.constraint.clone(),
            app_dir: self.app_dir.clone(),
            index: self.index_source(),
            sanitize: self.sanitize,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ManifestVersionArgs {
    /// Manifest file (go.mod, pyproject.toml, .python-version, package.json, composer.json)
    pub file: PathBuf,

    /// Declaration to read, detected from the file name when omitted
    #[arg(long)]
    pub kind: Option<ManifestKind>,
}

#[derive(Args, Debug, Clone)]
pub struct WebOptions {
    /// Application root
    #[arg(long, default_value = ".")]
    pub app_dir: PathBuf,

    /// Layer directory for generated files, sockets and pid files
    #[arg(long, default_value = ".")]
    pub layer_dir: PathBuf,

    /// app.yaml with a runtime_config section (defaults to GAE_APPLICATION_YAML_PATH)
    #[arg(long)]
    pub app_yaml: Option<PathBuf>,

    /// Resolved PHP version, enables version-gated php-fpm settings
    #[arg(long)]
    pub php_version: Option<String>,

    /// Number of php-fpm workers
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub workers: Option<u32>,

    /// Use a dynamic php-fpm pool
    #[arg(long)]
    pub dynamic_workers: bool,
}

impl WebOptions {
    pub fn to_request(&self) -> WebConfigRequest {
        WebConfigRequest {
            app_dir: self.app_dir.clone(),
            layer_dir: self.layer_dir.clone(),
            app_yaml: self.app_yaml.clone(),
            php_version: self.php_version.clone(),
            workers: self.workers,
            dynamic_workers: self.dynamic_workers,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Template (nginx-server, nginx-http-upstream, php-fpm-pool, supervisor-main)
    pub template: TemplateId,

    #[command(flatten)]
    pub web: WebOptions,

    /// Write the output to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PythonInstallArgs {
    /// Application root
    #[arg(long, default_value = ".")]
    pub app_dir: PathBuf,

    /// Layer dependencies are installed into
    #[arg(long)]
    pub layer_dir: PathBuf,

    /// Resolved Python version
    #[arg(long)]
    pub python_version: String,

    /// Print the commands without running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Log filter directive selected by the flags, if any
    ///
    /// `None` leaves the choice to `BPKIT_LOG_LEVEL`, then `RUST_LOG`.
    pub fn log_directive(&self) -> Option<String> {
        let level = match (&self.log_level, self.quiet, self.verbose) {
            (Some(level), _, _) => level.as_str(),
            (None, true, _) => "error",
            (None, false, true) => "debug",
            (None, false, false) => return None,
        };
        Some(format!("warn,bpkit={}", level))
    }

    /// Whether spinners should be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let args = CliArgs::parse_from(["bpkit", "resolve", "go"]);
        let Command::Resolve(resolve) = &args.command else {
            panic!("expected resolve");
        };
        assert_eq!(resolve.runtime, Runtime::Go);
        assert!(resolve.constraint.is_none());
        assert_eq!(resolve.app_dir, PathBuf::from("."));
        assert_eq!(resolve.index_source(), IndexSource::Published);
        assert!(!resolve.sanitize);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(!args.json);
    }

    #[test]
    fn test_resolve_options() {
        let args = CliArgs::parse_from([
            "bpkit",
            "resolve",
            "node",
            "--constraint",
            ">=18 <21",
            "--index-file",
            "versions.json",
            "--json",
        ]);
        let Command::Resolve(resolve) = &args.command else {
            panic!("expected resolve");
        };
        assert_eq!(resolve.runtime, Runtime::Nodejs);
        assert_eq!(resolve.constraint.as_deref(), Some(">=18 <21"));
        assert_eq!(
            resolve.index_source(),
            IndexSource::File(PathBuf::from("versions.json"))
        );
        assert!(args.json);
    }

    #[test]
    fn test_resolve_index_url() {
        let args = CliArgs::parse_from(["bpkit", "resolve", "php", "--index-url", "http://mirror/php.json"]);
        let Command::Resolve(resolve) = &args.command else {
            panic!("expected resolve");
        };
        assert_eq!(
            resolve.to_request().index,
            IndexSource::Url("http://mirror/php.json".to_string())
        );
    }

    #[test]
    fn test_index_sources_conflict() {
        let result = CliArgs::try_parse_from([
            "bpkit",
            "resolve",
            "go",
            "--index-file",
            "a.json",
            "--index-url",
            "http://b",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_runtime_rejected() {
        assert!(CliArgs::try_parse_from(["bpkit", "resolve", "cobol"]).is_err());
    }

    #[test]
    fn test_manifest_version_kind() {
        let args = CliArgs::parse_from([
            "bpkit",
            "manifest-version",
            "pyproject.toml",
            "--kind",
            "uv-requirement",
        ]);
        let Command::ManifestVersion(manifest) = &args.command else {
            panic!("expected manifest-version");
        };
        assert_eq!(manifest.file, PathBuf::from("pyproject.toml"));
        assert_eq!(manifest.kind, Some(ManifestKind::UvRequirement));
    }

    #[test]
    fn test_render_args() {
        let args = CliArgs::parse_from([
            "bpkit",
            "render",
            "php-fpm-pool",
            "--layer-dir",
            "/layers/php",
            "--workers",
            "4",
            "--dynamic-workers",
            "--out",
            "fpm.conf",
        ]);
        let Command::Render(render) = &args.command else {
            panic!("expected render");
        };
        assert_eq!(render.template, TemplateId::PhpFpmPool);
        let request = render.web.to_request();
        assert_eq!(request.layer_dir, PathBuf::from("/layers/php"));
        assert_eq!(request.workers, Some(4));
        assert!(request.dynamic_workers);
        assert_eq!(render.out, Some(PathBuf::from("fpm.conf")));
    }

    #[test]
    fn test_workers_must_be_positive() {
        assert!(CliArgs::try_parse_from(["bpkit", "webconfig", "--workers", "0"]).is_err());
        assert!(CliArgs::try_parse_from(["bpkit", "render", "php-fpm-pool", "--workers", "0"]).is_err());

        let args = CliArgs::parse_from(["bpkit", "webconfig", "--workers", "1"]);
        let Command::Webconfig(web) = &args.command else {
            panic!("expected webconfig");
        };
        assert_eq!(web.workers, Some(1));
    }

    #[test]
    fn test_render_unknown_template() {
        assert!(CliArgs::try_parse_from(["bpkit", "render", "apache"]).is_err());
    }

    #[test]
    fn test_python_install_args() {
        let args = CliArgs::parse_from([
            "bpkit",
            "python-install",
            "--layer-dir",
            "/layers/deps",
            "--python-version",
            "3.12.4",
            "-n",
        ]);
        let Command::PythonInstall(install) = &args.command else {
            panic!("expected python-install");
        };
        assert_eq!(install.python_version, "3.12.4");
        assert!(install.dry_run);
    }

    #[test]
    fn test_log_directive() {
        let args = CliArgs::parse_from(["bpkit", "webconfig"]);
        assert_eq!(args.log_directive(), None);

        let args = CliArgs::parse_from(["bpkit", "webconfig", "--verbose"]);
        assert_eq!(args.log_directive().as_deref(), Some("warn,bpkit=debug"));

        let args = CliArgs::parse_from(["bpkit", "-q", "webconfig"]);
        assert_eq!(args.log_directive().as_deref(), Some("warn,bpkit=error"));
        assert!(!args.show_progress());

        let args = CliArgs::parse_from(["bpkit", "webconfig", "--quiet", "--log-level", "trace"]);
        assert_eq!(args.log_directive().as_deref(), Some("warn,bpkit=trace"));
    }

    #[test]
    fn test_invalid_log_level() {
        assert!(CliArgs::try_parse_from(["bpkit", "webconfig", "--log-level", "loud"]).is_err());
    }
}
