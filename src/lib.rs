//! bpkit - runtime version resolution and web server configuration for buildpacks
//!
//! This library provides the pieces buildpacks share:
//! - Version discovery from the environment and manifests (go.mod,
//!   .python-version, package.json, composer.json, pyproject.toml)
//! - Resolution of version constraints against published version indices
//! - nginx, php-fpm and supervisord configuration rendering
//! - PHP launch processes and Python dependency installers

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod installer;
pub mod launch;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod render;
pub mod resolver;
