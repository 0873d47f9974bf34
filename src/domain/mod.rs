//! Core domain models for bpkit
//!
//! This module contains the fundamental types used throughout the application:
//! - Runtime catalogue for supported language runtimes
//! - Version specifications and the constraint dialect
//! - Available version sets published by runtime indices
//! - User overrides read from app.yaml

mod available;
mod constraint;
mod runtime;
mod runtime_config;
mod version_spec;

pub use available::{AvailableVersion, AvailableVersionSet, Candidate};
pub use constraint::Constraint;
pub use runtime::{format_name, Runtime, GO_RELEASES_URL, RUNTIME_VERSIONS_URL};
pub use runtime_config::{AppYaml, RuntimeConfig};
pub use version_spec::{
    coerce_version, is_release_candidate, normalize_prerelease, VersionSpec, VersionSpecKind,
};
