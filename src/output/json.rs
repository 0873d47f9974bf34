//! JSON output formatter for machine processing

use crate::orchestrator::{InstallReport, ResolveOutcome, WebConfigOutcome};
use crate::output::{DeclaredVersion, OutputFormatter};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    fn write_json<T: Serialize>(&self, value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{}", json)
    }
}

/// JSON representation of a manifest declaration
#[derive(Serialize)]
struct JsonDeclared<'a> {
    path: String,
    /// `null` when the manifest declares no version
    version: Option<&'a str>,
}

impl OutputFormatter for JsonFormatter {
    fn format_resolve(
        &self,
        outcome: &ResolveOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_json(outcome, writer)
    }

    fn format_declared(
        &self,
        declared: &DeclaredVersion<'_>,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_json(
            &JsonDeclared {
                path: declared.path.display().to_string(),
                version: declared.version,
            },
            writer,
        )
    }

    fn format_webconfig(
        &self,
        outcome: &WebConfigOutcome,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_json(outcome, writer)
    }

    fn format_install(
        &self,
        report: &InstallReport,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        self.write_json(report, writer)
    }
}
