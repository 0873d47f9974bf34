//! Integration tests for bpkit
//!
//! These tests exercise the public library API across modules:
//! - Version discovery from manifests feeding the resolver
//! - Index files feeding the resolver
//! - Overrides from app.yaml flowing into rendered configuration

use bpkit::config::BuildConfig;
use bpkit::domain::{AvailableVersion, AvailableVersionSet, Runtime};
use bpkit::error::{ErrorKind, VersionError};
use bpkit::render::{ConfigRenderer, Overrides, RenderedConfig, TemplateId, WebConfig};
use bpkit::resolver::{discover_version, VersionOrigin, VersionResolver};
use std::fs;
use tempfile::TempDir;

fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

fn build_config(vars: &[(&str, &str)]) -> BuildConfig {
    BuildConfig::from_vars(vars.iter().map(|(k, v)| (*k, *v))).unwrap()
}

mod version_resolution {
    use super::*;

    fn available(entries: &[(&str, bool)]) -> AvailableVersionSet {
        AvailableVersionSet::new(
            entries
                .iter()
                .map(|(v, stable)| AvailableVersion::new(*v, *stable))
                .collect(),
            "https://example.test/versions.json",
        )
    }

    #[test]
    fn test_exact_versions_bypass_available_set() {
        let resolver = VersionResolver::new();
        let empty = AvailableVersionSet::default();
        for exact in ["1.2.3", "10.0.0", "1.22.0-rc1", "3.12.0rc2"] {
            assert_eq!(resolver.resolve_str(exact, &empty).unwrap().version, exact);
        }
    }

    #[test]
    fn test_highest_stable_satisfying_entry() {
        let set = available(&[("1.2.0", true), ("1.3.0", false), ("1.2.5", true)]);
        let resolved = VersionResolver::new().resolve_str(">=1.2.0", &set).unwrap();
        assert_eq!(resolved.version, "1.2.5");
        assert_eq!(
            resolved.source.as_deref(),
            Some("https://example.test/versions.json")
        );
    }

    #[test]
    fn test_no_matching_version_names_source() {
        let set = available(&[("1.0.0", true)]);
        let err = VersionResolver::new().resolve_str(">=9.9.9", &set).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoMatchingVersion);
        match err {
            VersionError::NoMatchingVersion {
                constraint,
                source_name,
            } => {
                assert_eq!(constraint, ">=9.9.9");
                assert_eq!(source_name, "https://example.test/versions.json");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_go_mod_declaration_resolves() {
        let dir = create_test_dir();
        fs::write(
            dir.path().join("go.mod"),
            "module example.com/hello\n\ngo 1.21 // toolchain floor\ngo 1.20\n",
        )
        .unwrap();

        let requested = discover_version(Runtime::Go, &BuildConfig::default(), dir.path()).unwrap();
        assert_eq!(requested.value, "1.21");
        assert!(matches!(requested.origin, VersionOrigin::Manifest(_)));

        let set = available(&[("1.20.14", true), ("1.21.13", true), ("1.22.6", true)]);
        let resolved = VersionResolver::new().resolve_str(&requested.value, &set).unwrap();
        assert_eq!(resolved.version, "1.21.13");
    }

    #[test]
    fn test_env_version_beats_manifest() {
        let dir = create_test_dir();
        fs::write(dir.path().join(".python-version"), "3.11\n").unwrap();

        let config = build_config(&[("GOOGLE_PYTHON_VERSION", "3.12.x")]);
        let requested = discover_version(Runtime::Python, &config, dir.path()).unwrap();
        assert_eq!(requested.value, "3.12.x");
        assert_eq!(
            requested.origin,
            VersionOrigin::Env("GOOGLE_PYTHON_VERSION".to_string())
        );
    }

    #[test]
    fn test_composer_constraint_resolves() {
        let dir = create_test_dir();
        fs::write(
            dir.path().join("composer.json"),
            r#"{"require": {"php": "^8.1 || ^7.4", "laravel/framework": "^10.0"}}"#,
        )
        .unwrap();

        let requested = discover_version(Runtime::Php, &BuildConfig::default(), dir.path()).unwrap();
        let set = available(&[("7.4.33", true), ("8.2.20", true), ("9.0.0", true)]);
        let resolved = VersionResolver::new().resolve_str(&requested.value, &set).unwrap();
        assert_eq!(resolved.version, "8.2.20");
    }

    #[test]
    fn test_index_file_feeds_resolver() {
        let dir = create_test_dir();
        let path = dir.path().join("go.json");
        fs::write(
            &path,
            r#"[
                {"version": "go1.23rc2", "stable": false},
                {"version": "go1.22.5", "stable": true},
                {"version": "go1.21.12", "stable": true}
            ]"#,
        )
        .unwrap();

        let set = bpkit::registry::load_index_file(&path).unwrap();
        let resolved = VersionResolver::new().resolve_str("1.*", &set).unwrap();
        assert_eq!(resolved.version, "1.22.5");
    }
}

mod config_rendering {
    use super::*;

    #[test]
    fn test_rendering_is_byte_stable() {
        let renderer = ConfigRenderer::new().unwrap();
        let config = WebConfig::new("/layers/php").with_workers(3, true);
        for template in TemplateId::all() {
            let first = renderer.render(*template, &config).unwrap();
            let second = ConfigRenderer::new().unwrap().render(*template, &config).unwrap();
            assert_eq!(first.text().as_bytes(), second.text().as_bytes());
        }
    }

    #[test]
    fn test_dynamic_and_static_pools_are_exclusive() {
        let renderer = ConfigRenderer::new().unwrap();

        let dynamic = renderer
            .render(TemplateId::PhpFpmPool, &WebConfig::new("/l").with_workers(2, true))
            .unwrap();
        assert!(dynamic.text().contains("pm = dynamic"));
        assert!(!dynamic.text().contains("pm = static"));

        let fixed = renderer
            .render(TemplateId::PhpFpmPool, &WebConfig::new("/l").with_workers(2, false))
            .unwrap();
        assert!(fixed.text().contains("pm = static"));
        assert!(!fixed.text().contains("pm = dynamic"));
    }

    #[test]
    fn test_app_yaml_overrides_flow_into_templates() {
        let dir = create_test_dir();
        fs::write(dir.path().join("php-fpm.conf"), "[www]\n").unwrap();
        let app_yaml = dir.path().join("app.yaml");
        fs::write(
            &app_yaml,
            "runtime: php\nenv: flex\nruntime_config:\n  document_root: web\n  front_controller_file: app.php\n",
        )
        .unwrap();

        let config = build_config(&[
            ("X_GOOGLE_TARGET_PLATFORM", "flex"),
            ("GAE_APPLICATION_YAML_PATH", app_yaml.to_str().unwrap()),
        ]);
        let runtime_config = bpkit::manifest::runtime_config_from_env(&config).unwrap();
        let overrides = Overrides::resolve(&runtime_config, dir.path(), &config);
        let web = WebConfig::from_build(&config, "/layers/php", overrides);

        let renderer = ConfigRenderer::new().unwrap();
        let server = renderer.render(TemplateId::NginxServer, &web).unwrap();
        assert!(server.text().contains("\troot\t/workspace/web;\n"));
        assert!(server.text().contains("/app.php$uri;"));

        let upstream = renderer.render(TemplateId::NginxHttpUpstream, &web).unwrap();
        assert!(upstream.text().contains("127.0.0.1:9000"));

        assert_eq!(
            renderer.render(TemplateId::PhpFpmPool, &web).unwrap(),
            RenderedConfig::Override {
                path: "/workspace/php-fpm.conf".to_string()
            }
        );
    }
}
