//! Launch process for PHP web applications
//!
//! Builds the `web` process that starts nginx and php-fpm together, either
//! through the pid1 process manager or through supervisord when the
//! application brings supervisord configuration.

use crate::config::BuildConfig;
use crate::render::{WebConfig, MIME_TYPES_PATH};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

const PROCFILE: &str = "Procfile";
const PID1_BINARY: &str = "pid1";
/// Port php-fpm listens on when nginx reaches it over TCP
const FLEX_APP_PORT: &str = "9000";

/// Process manager running nginx and php-fpm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessManager {
    Pid1,
    Supervisord,
}

impl ProcessManager {
    /// supervisord when the application supplies or extends its configuration
    pub fn select(config: &WebConfig) -> Self {
        if config.overrides.supervisord_conf.is_some()
            || config.overrides.supervisord_addition.is_some()
        {
            ProcessManager::Supervisord
        } else {
            ProcessManager::Pid1
        }
    }
}

/// A process declared for the launch image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchProcess {
    #[serde(rename = "type")]
    pub process_type: String,
    pub command: Vec<String>,
    pub manager: ProcessManager,
}

impl LaunchProcess {
    /// The command joined into a single shell line
    pub fn command_line(&self) -> String {
        self.command
            .iter()
            .map(|arg| {
                if arg.contains(char::is_whitespace) {
                    format!("\"{}\"", arg)
                } else {
                    arg.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for LaunchProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.process_type, self.command_line())
    }
}

/// Builds the web process, or `None` when the application declares its own
///
/// A `Procfile` in the application root or `GOOGLE_ENTRYPOINT` take over
/// the launch command.
pub fn web_process(build: &BuildConfig, app_dir: &Path, config: &WebConfig) -> Option<LaunchProcess> {
    if app_dir.join(PROCFILE).is_file() {
        info!("Procfile found, skipping web process");
        return None;
    }
    if build.entrypoint.is_some() {
        info!("entrypoint set, skipping web process");
        return None;
    }

    let manager = ProcessManager::select(config);
    let command = match manager {
        ProcessManager::Pid1 => pid1_command(build, config),
        ProcessManager::Supervisord => supervisord_command(config),
    };

    Some(LaunchProcess {
        process_type: "web".to_string(),
        command,
        manager,
    })
}

fn php_fpm_command(config: &WebConfig) -> String {
    format!(
        "php-fpm -R --nodaemonize --fpm-config {}",
        config.php_fpm_conf_path()
    )
}

fn pid1_command(build: &BuildConfig, config: &WebConfig) -> Vec<String> {
    let layer = |name: &str| config.layer_dir.join(name).display().to_string();
    let pid1 = build
        .pid1_dir
        .as_ref()
        .map(|dir| dir.join(PID1_BINARY))
        .unwrap_or_else(|| PathBuf::from(PID1_BINARY));

    let mut command = vec![
        pid1.display().to_string(),
        "--nginxBinaryPath".to_string(),
        "nginx".to_string(),
        "--nginxErrLogFilePath".to_string(),
        layer("nginx.log"),
        "--customAppCmd".to_string(),
        php_fpm_command(config),
        "--pid1LogFilePath".to_string(),
        layer("pid1.log"),
        "--mimeTypesPath".to_string(),
        MIME_TYPES_PATH.to_string(),
    ];

    if config.flex {
        command.extend(["--customAppPort".to_string(), FLEX_APP_PORT.to_string()]);
    } else {
        command.extend(["--customAppSocket".to_string(), config.socket_path()]);
    }

    match &config.overrides.nginx_conf {
        Some(path) => command.extend(["--nginxConfigPath".to_string(), path.clone()]),
        None => {
            command.extend([
                "--nginxConfigPath".to_string(),
                config.nginx_conf_path(),
                "--serverConfigPath".to_string(),
                config.server_conf_path(),
            ]);
            if let Some(include) = &config.overrides.nginx_http_include {
                command.extend(["--httpIncludeConfigPath".to_string(), include.clone()]);
            }
        }
    }

    command
}

fn supervisord_command(config: &WebConfig) -> Vec<String> {
    vec![
        "supervisord".to_string(),
        "-c".to_string(),
        config.supervisord_conf_path(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn build() -> BuildConfig {
        BuildConfig {
            pid1_dir: Some(PathBuf::from("/layers/pid1")),
            ..BuildConfig::default()
        }
    }

    #[test]
    fn test_pid1_socket_command() {
        let dir = tempfile::tempdir().unwrap();
        let config = WebConfig::new("/layers/php");
        let process = web_process(&build(), dir.path(), &config).unwrap();

        assert_eq!(process.process_type, "web");
        assert_eq!(process.manager, ProcessManager::Pid1);
        assert_eq!(process.command[0], "/layers/pid1/pid1");
        assert!(process
            .command
            .contains(&"php-fpm -R --nodaemonize --fpm-config /layers/php/php-fpm.conf".to_string()));

        let line = process.command_line();
        assert!(line.contains("--customAppSocket /layers/php/app.sock"));
        assert!(line.contains("--nginxConfigPath /layers/php/nginx.conf"));
        assert!(line.contains("--serverConfigPath /layers/php/nginx-server.conf"));
        assert!(line.contains("--customAppCmd \"php-fpm -R"));
        assert!(!line.contains("--httpIncludeConfigPath"));
    }

    #[test]
    fn test_pid1_flex_with_nginx_override() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = WebConfig::new("/layers/php");
        config.flex = true;
        config.overrides.nginx_conf = Some("/workspace/nginx.conf".to_string());

        let line = web_process(&BuildConfig::default(), dir.path(), &config)
            .unwrap()
            .command_line();
        assert!(line.starts_with("pid1 "));
        assert!(line.contains("--customAppPort 9000"));
        assert!(line.ends_with("--nginxConfigPath /workspace/nginx.conf"));
        assert!(!line.contains("--serverConfigPath"));
    }

    #[test]
    fn test_pid1_http_include() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = WebConfig::new("/layers/php");
        config.overrides.nginx_http_include = Some("/workspace/nginx-http.conf".to_string());

        let line = web_process(&build(), dir.path(), &config).unwrap().command_line();
        assert!(line.ends_with("--httpIncludeConfigPath /workspace/nginx-http.conf"));
    }

    #[test]
    fn test_supervisord_command() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = WebConfig::new("/layers/php");
        config.overrides.supervisord_addition =
            Some("/workspace/additional-supervisord.conf".to_string());

        let process = web_process(&build(), dir.path(), &config).unwrap();
        assert_eq!(process.manager, ProcessManager::Supervisord);
        assert_eq!(process.command_line(), "supervisord -c /layers/php/supervisord.conf");

        config.overrides.supervisord_conf = Some("/workspace/supervisord.conf".to_string());
        let process = web_process(&build(), dir.path(), &config).unwrap();
        assert_eq!(process.to_string(), "web: supervisord -c /workspace/supervisord.conf");
    }

    #[test]
    fn test_procfile_or_entrypoint_skips_process() {
        let dir = tempfile::tempdir().unwrap();
        let config = WebConfig::new("/layers/php");

        let with_entrypoint = BuildConfig {
            entrypoint: Some("php -S 0.0.0.0:8080".to_string()),
            ..BuildConfig::default()
        };
        assert!(web_process(&with_entrypoint, dir.path(), &config).is_none());

        fs::write(dir.path().join("Procfile"), "web: php -S 0.0.0.0:8080\n").unwrap();
        assert!(web_process(&build(), dir.path(), &config).is_none());
    }
}
