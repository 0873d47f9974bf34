//! Python dependency installer strategies
//!
//! This module provides:
//! - Selection of the installer (pip, uv or poetry) once per build
//! - The commands each installer runs for tool and dependency installation
//! - Execution of those commands through a [`CommandRunner`]

use crate::config::BuildConfig;
use crate::error::{ConfigError, ManifestError};
use crate::manifest::{read_declared_version, ManifestKind};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Requirements file installed by pip
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Python dependency installer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PythonInstaller {
    /// pip with requirements.txt or a PEP 517 project
    Pip,
    /// uv with uv.lock
    Uv,
    /// Poetry with poetry.lock
    Poetry,
}

impl PythonInstaller {
    /// Selects the installer for an application
    ///
    /// `GOOGLE_PYTHON_PACKAGE_MANAGER` wins; otherwise a lockfile decides,
    /// falling back to pip.
    pub fn select(config: &BuildConfig, app_dir: &Path) -> Self {
        if let Some(installer) = config.python_installer {
            debug!(%installer, "installer requested through the environment");
            return installer;
        }
        if app_dir.join("poetry.lock").exists() {
            return PythonInstaller::Poetry;
        }
        if app_dir.join("uv.lock").exists() {
            return PythonInstaller::Uv;
        }
        PythonInstaller::Pip
    }

    pub fn id(&self) -> &'static str {
        match self {
            PythonInstaller::Pip => "pip",
            PythonInstaller::Uv => "uv",
            PythonInstaller::Poetry => "poetry",
        }
    }

    /// Returns the lockfile this installer maintains
    pub fn lockfile(&self) -> Option<&'static str> {
        match self {
            PythonInstaller::Pip => None,
            PythonInstaller::Uv => Some("uv.lock"),
            PythonInstaller::Poetry => Some("poetry.lock"),
        }
    }

    /// Returns the pyproject.toml declaration constraining the tool version
    pub fn requirement_kind(&self) -> Option<ManifestKind> {
        match self {
            PythonInstaller::Pip => None,
            PythonInstaller::Uv => Some(ManifestKind::UvRequirement),
            PythonInstaller::Poetry => Some(ManifestKind::PoetryRequirement),
        }
    }

    /// Reads the tool constraint declared in pyproject.toml
    pub fn requested_tool_version(&self, app_dir: &Path) -> Result<Option<String>, ManifestError> {
        match self.requirement_kind() {
            Some(kind) => read_declared_version(&app_dir.join(kind.file_name()), kind),
            None => Ok(None),
        }
    }

    /// Returns the command installing the tool itself; pip ships with Python
    pub fn tool_install_command(&self, constraint: Option<&str>) -> Option<InstallCommand> {
        if *self == PythonInstaller::Pip {
            return None;
        }
        let requirement = format!("{}{}", self.id(), constraint.unwrap_or(""));
        Some(InstallCommand::new(["python3", "-m", "pip", "install"]).arg(requirement))
    }

    /// Returns the command generating a missing lockfile
    pub fn lock_command(&self) -> Option<InstallCommand> {
        match self {
            PythonInstaller::Pip => None,
            PythonInstaller::Uv => Some(InstallCommand::new(["uv", "lock"])),
            PythonInstaller::Poetry => {
                Some(InstallCommand::new(["poetry", "lock", "--no-interaction"]))
            }
        }
    }

    /// Returns the pip command installing a requirements file into the user site of a layer
    pub fn requirements_install_command(layer: &Path, requirements: &str) -> InstallCommand {
        InstallCommand::new(["python3", "-m", "pip", "install", "--requirement"])
            .arg(requirements)
            .arg("--upgrade")
            .arg("--upgrade-strategy")
            .arg("only-if-needed")
            .arg("--no-warn-script-location")
            .arg("--no-warn-conflicts")
            .arg("--force-reinstall")
            .arg("--no-compile")
            .arg("--disable-pip-version-check")
            .arg("--no-cache-dir")
            .arg("--user")
            .env("PYTHONUSERBASE", layer.display().to_string())
    }

    /// Returns the command installing application dependencies into a layer
    ///
    /// For pip this is the pyproject.toml install; requirements.txt apps go
    /// through [`PythonInstaller::requirements_install_command`].
    pub fn dependency_install_command(&self, layer: &Path, python_version: &str) -> InstallCommand {
        match self {
            PythonInstaller::Pip => InstallCommand::new([
                "python3",
                "-m",
                "pip",
                "install",
                ".",
                "--upgrade",
                "--upgrade-strategy",
                "only-if-needed",
                "--no-warn-script-location",
                "--disable-pip-version-check",
                "--no-cache-dir",
            ])
            .env("PYTHONUSERBASE", layer.display().to_string()),
            PythonInstaller::Uv => InstallCommand::new(["uv", "sync", "--active", "--link-mode=copy"])
                .arg("--python")
                .arg(python_version)
                .env("VIRTUAL_ENV", layer.join(".venv").display().to_string()),
            PythonInstaller::Poetry => InstallCommand::new([
                "poetry",
                "install",
                "--no-interaction",
                "--sync",
                "--only",
                "main",
                "--no-root",
            ])
            .env("POETRY_VIRTUALENVS_PATH", layer.display().to_string())
            .env("POETRY_VIRTUALENVS_CREATE", "true")
            .env("POETRY_VIRTUALENVS_IN_PROJECT", "false"),
        }
    }

    /// Returns every command needed to install dependencies, in order
    pub fn plan(
        &self,
        app_dir: &Path,
        layer: &Path,
        python_version: &str,
    ) -> Result<Vec<InstallCommand>, ManifestError> {
        let mut commands = Vec::new();

        let constraint = self.requested_tool_version(app_dir)?;
        if let Some(cmd) = self.tool_install_command(constraint.as_deref()) {
            commands.push(cmd);
        }

        if let (Some(lockfile), Some(cmd)) = (self.lockfile(), self.lock_command()) {
            if !app_dir.join(lockfile).exists() {
                info!("{} not found, generating it", lockfile);
                commands.push(cmd);
            }
        }

        if *self == PythonInstaller::Pip && app_dir.join(REQUIREMENTS_FILE).exists() {
            commands.push(Self::requirements_install_command(layer, REQUIREMENTS_FILE));
        } else {
            commands.push(self.dependency_install_command(layer, python_version));
        }
        Ok(commands)
    }
}

impl fmt::Display for PythonInstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for PythonInstaller {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pip" => Ok(PythonInstaller::Pip),
            "uv" => Ok(PythonInstaller::Uv),
            "poetry" => Ok(PythonInstaller::Poetry),
            _ => Err(ConfigError::UnknownInstaller {
                var: crate::config::ENV_PYTHON_PACKAGE_MANAGER.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Returns the command installing supervisord into a layer
pub fn supervisor_install_command(layer: &Path) -> InstallCommand {
    InstallCommand::new([
        "python3",
        "-m",
        "pip",
        "install",
        "supervisor",
        "--upgrade",
        "--no-warn-script-location",
        "--no-compile",
        "--disable-pip-version-check",
        "--no-cache-dir",
    ])
    .env("PYTHONUSERBASE", layer.display().to_string())
}

/// A command line plus the environment it runs with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallCommand {
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl InstallCommand {
    /// Creates a command from its arguments
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Returns the program name
    pub fn program(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or("")
    }
}

impl fmt::Display for InstallCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args.join(" "))
    }
}

/// Result of running an install command
#[derive(Debug, Clone, Serialize)]
pub struct InstallResult {
    /// The command that was executed
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Standard output from the command
    pub stdout: String,
    /// Standard error from the command
    pub stderr: String,
}

impl InstallResult {
    /// Create a successful install result
    pub fn success(command: String, stdout: String, stderr: String) -> Self {
        Self {
            command,
            success: true,
            stdout,
            stderr,
        }
    }

    /// Create a failed install result
    pub fn failure(command: String, stdout: String, stderr: String) -> Self {
        Self {
            command,
            success: false,
            stdout,
            stderr,
        }
    }
}

/// Trait for running install commands
pub trait CommandRunner {
    /// Run a command in the specified directory
    fn run(&self, command: &InstallCommand, working_dir: &Path) -> InstallResult;
}

/// Runner that executes real processes
#[derive(Debug, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &InstallCommand, working_dir: &Path) -> InstallResult {
        let command_line = command.to_string();
        if command.args.is_empty() {
            return InstallResult::failure(command_line, String::new(), "Empty command".to_string());
        }

        info!("Running: {}", command_line);
        let output = Command::new(&command.args[0])
            .args(&command.args[1..])
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(working_dir)
            .output();

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                if output.status.success() {
                    InstallResult::success(command_line, stdout, stderr)
                } else {
                    warn!(status = ?output.status.code(), "{} failed", command_line);
                    InstallResult::failure(command_line, stdout, stderr)
                }
            }
            Err(e) => InstallResult::failure(
                command_line,
                String::new(),
                format!("Failed to execute {}: {}", command.program(), e),
            ),
        }
    }
}

/// Runs commands in order and stops at the first failure
pub fn run_all(
    runner: &dyn CommandRunner,
    commands: &[InstallCommand],
    working_dir: &Path,
) -> Vec<InstallResult> {
    run_all_with(runner, commands, working_dir, |_| {})
}

/// Like [`run_all`], calling `on_step` after each command that ran
pub fn run_all_with(
    runner: &dyn CommandRunner,
    commands: &[InstallCommand],
    working_dir: &Path,
    mut on_step: impl FnMut(&InstallResult),
) -> Vec<InstallResult> {
    let mut results = Vec::new();
    for command in commands {
        let result = runner.run(command, working_dir);
        on_step(&result);
        let failed = !result.success;
        results.push(result);
        if failed {
            break;
        }
    }
    results
}
