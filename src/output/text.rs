//! Text output formatter for human-readable display
//!
//! Normal output keeps the first line of every command machine-friendly
//! (a bare version for `resolve`), so build scripts can capture it.

use crate::orchestrator::{InstallReport, ResolveOutcome, WebConfigOutcome};
use crate::output::{DeclaredVersion, OutputFormatter, Verbosity};
use crate::render::EnvScope;
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn dimmed(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn status(&self, success: bool) -> String {
        match (success, self.color) {
            (true, true) => "✓".green().to_string(),
            (false, true) => "✗".red().bold().to_string(),
            (true, false) => "ok".to_string(),
            (false, false) => "failed".to_string(),
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_resolve(
        &self,
        outcome: &ResolveOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(writer, "{}", outcome.resolved.version)?;

        if self.verbosity == Verbosity::Verbose {
            writeln!(
                writer,
                "  {} {} {}",
                self.dimmed("requested:"),
                outcome.requested.value,
                self.dimmed(&format!("({})", outcome.requested.origin))
            )?;
            if let Some(source) = &outcome.resolved.source {
                writeln!(writer, "  {} {}", self.dimmed("source:"), source)?;
            }
        }
        Ok(())
    }

    fn format_declared(
        &self,
        declared: &DeclaredVersion<'_>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        match (declared.version, self.verbosity) {
            (Some(version), Verbosity::Verbose) => {
                writeln!(writer, "{} {}", version, self.dimmed(&format!("({})", declared.path.display())))
            }
            (Some(version), _) => writeln!(writer, "{}", version),
            (None, _) => Ok(()),
        }
    }

    fn format_webconfig(
        &self,
        outcome: &WebConfigOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            if let Some(process) = &outcome.process {
                writeln!(writer, "{}", process.command_line())?;
            }
            return Ok(());
        }

        let width = outcome
            .files
            .iter()
            .map(|f| f.template.len())
            .max()
            .unwrap_or(0);

        for file in &outcome.files {
            let marker = if file.overridden {
                format!(" {}", self.dimmed("(override)"))
            } else {
                String::new()
            };
            writeln!(
                writer,
                "  {:width$} {}{}",
                file.template,
                file.path.display(),
                marker,
                width = width
            )?;
        }

        for var in &outcome.environment {
            let scope = match var.scope {
                EnvScope::Build => "build",
                EnvScope::Launch => "launch",
            };
            writeln!(writer, "  {} {}={}", self.dimmed(scope), var.name, var.value)?;
        }

        for command in &outcome.setup {
            writeln!(writer, "  {} {}", self.dimmed("setup"), command)?;
        }

        match &outcome.process {
            Some(process) if self.color => writeln!(writer, "{}", process.to_string().bold()),
            Some(process) => writeln!(writer, "{}", process),
            None => writeln!(writer, "{}", self.dimmed("no web process (Procfile or entrypoint)")),
        }
    }

    fn format_install(
        &self,
        report: &InstallReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let header = if report.dry_run {
            format!("{} (dry-run)", report.installer)
        } else {
            report.installer.to_string()
        };
        if self.verbosity != Verbosity::Quiet {
            if self.color {
                writeln!(writer, "{}", header.bold())?;
            } else {
                writeln!(writer, "{}", header)?;
            }
        }

        if report.dry_run {
            for command in &report.commands {
                writeln!(writer, "  {}", command)?;
            }
            return Ok(());
        }

        for result in &report.results {
            if result.success && self.verbosity == Verbosity::Quiet {
                continue;
            }
            writeln!(writer, "  {} {}", self.status(result.success), result.command)?;
            if !result.success && !result.stderr.trim().is_empty() {
                writeln!(writer, "    {}", result.stderr.trim())?;
            }
        }
        Ok(())
    }
}
