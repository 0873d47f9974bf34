//! bpkit - buildpack runtime versions and web server configuration
//!
//! Commands:
//! - resolve: pick the runtime version to install
//! - manifest-version: print the version a manifest declares
//! - render / webconfig: generate nginx, php-fpm and supervisord configuration
//! - python-install: install Python dependencies

use bpkit::cli::{CliArgs, Command, LOG_LEVEL_ENV};
use bpkit::config::BuildConfig;
use bpkit::installer::SystemCommandRunner;
use bpkit::manifest::{read_declared_version, ManifestKind};
use bpkit::orchestrator::Orchestrator;
use bpkit::output::{create_formatter, DeclaredVersion, OutputConfig};
use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(&args);

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries command output only
fn init_logging(args: &CliArgs) {
    let filter = match args.log_directive() {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_env(LOG_LEVEL_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    debug!("bpkit v{}", env!("CARGO_PKG_VERSION"));

    let build = BuildConfig::from_env()?;
    let orchestrator = Orchestrator::new(build, args.show_progress())?;
    let formatter = create_formatter(OutputConfig::from_cli(args.json, args.verbose, args.quiet));
    let mut stdout = io::stdout().lock();

    let exit_code = match &args.command {
        Command::Resolve(resolve) => {
            let outcome = orchestrator.resolve(&resolve.to_request()).await?;
            formatter.format_resolve(&outcome, &mut stdout)?;
            ExitCode::SUCCESS
        }
        Command::ManifestVersion(manifest) => {
            let kind = match manifest.kind {
                Some(kind) => kind,
                None => ManifestKind::detect(&manifest.file)?,
            };
            let version = read_declared_version(&manifest.file, kind)?;
            let declared = DeclaredVersion {
                path: &manifest.file,
                version: version.as_deref(),
            };
            formatter.format_declared(&declared, &mut stdout)?;
            ExitCode::SUCCESS
        }
        Command::Render(render) => {
            let rendered = orchestrator.render(render.template, &render.web.to_request())?;
            match &render.out {
                Some(path) => writeln!(stdout, "{}", rendered.write_to(path)?.display())?,
                None if rendered.is_override() => writeln!(stdout, "{}", rendered.text())?,
                None => write!(stdout, "{}", rendered.text())?,
            }
            ExitCode::SUCCESS
        }
        Command::Webconfig(web) => {
            let outcome = orchestrator.write_web_config(&web.to_request())?;
            formatter.format_webconfig(&outcome, &mut stdout)?;
            ExitCode::SUCCESS
        }
        Command::PythonInstall(install) => {
            let report = orchestrator.python_install(
                &install.app_dir,
                &install.layer_dir,
                &install.python_version,
                &SystemCommandRunner::new(),
                install.dry_run,
            )?;
            formatter.format_install(&report, &mut stdout)?;
            if report.succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    };

    stdout.flush()?;
    Ok(exit_code)
}
