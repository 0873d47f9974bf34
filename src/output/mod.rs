//! Output formatting for command results
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::orchestrator::{InstallReport, ResolveOutcome, WebConfigOutcome};
use std::io::Write;
use std::path::Path;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Bare values only
    Quiet,
    #[default]
    Normal,
    /// Include origins and sources
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbosity: Verbosity,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(json: bool, verbose: bool, quiet: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            format,
            verbosity,
            color: true,
        }
    }
}

/// A version declared by a manifest file
#[derive(Debug, Clone, Copy)]
pub struct DeclaredVersion<'a> {
    pub path: &'a Path,
    pub version: Option<&'a str>,
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a version resolution
    fn format_resolve(&self, outcome: &ResolveOutcome, writer: &mut dyn Write)
        -> std::io::Result<()>;

    /// Format a manifest declaration; an absent version prints nothing in text mode
    fn format_declared(
        &self,
        declared: &DeclaredVersion<'_>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Format the written web configuration
    fn format_webconfig(
        &self,
        outcome: &WebConfigOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;

    /// Format a dependency installation
    fn format_install(&self, report: &InstallReport, writer: &mut dyn Write)
        -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.verbosity, config.color)),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}
