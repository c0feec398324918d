//! Configuration management.

mod file_config;

pub use file_config::{read_config_file, write_config_file, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::rail::RailSettings;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Rail behaviour
    #[serde(default)]
    pub rail: RailSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when neither `RUST_LOG` nor `-v` is given
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "text" (default) or "json"
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

impl LoggingConfig {
    /// Whether JSON log lines were requested
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "eresources-nav.toml";

/// Prefix for environment overrides, e.g. `ERESOURCES_NAV_RAIL__POST_ACTIVATION`
pub const ENV_PREFIX: &str = "ERESOURCES_NAV";

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    load_config_with_env(path, None)
}

/// Load configuration, reading overrides from `env` instead of the process
/// environment when given
fn load_config_with_env(
    path: &Path,
    env: Option<config::Map<String, String>>,
) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path).format(config::FileFormat::Toml))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(env),
        )
        .build()?;

    settings.try_deserialize()
}

/// Default location of the user configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("eresources-nav").join("config.toml"))
}

/// Find a configuration file in the working directory or the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    default_config_path().filter(|path| path.is_file())
}

/// Get the default configuration
pub fn get_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rail::{CuePolicy, PostActivationPolicy};
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = get_config();
        assert_eq!(config.rail.post_activation, PostActivationPolicy::Collapse);
        assert_eq!(config.rail.cue, CuePolicy::Indefinite);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.is_json());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[rail]
post_activation = "restart_cascade"

[rail.cue]
mode = "heartbeat"
repeats = 5

[logging]
level = "debug"
format = "json"
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.rail.post_activation,
            PostActivationPolicy::RestartCascade
        );
        assert_eq!(config.rail.cue, CuePolicy::Heartbeat { repeats: 5 });
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[rail]
post_activation = "collapse"

[logging]
level = "info"
"#
        )
        .unwrap();

        let mut env = config::Map::new();
        env.insert(
            "ERESOURCES_NAV_RAIL__POST_ACTIVATION".to_string(),
            "restart_cascade".to_string(),
        );
        env.insert(
            "ERESOURCES_NAV_LOGGING__LEVEL".to_string(),
            "trace".to_string(),
        );
        // Variables without the prefix are not ours
        env.insert("RAIL__POST_ACTIVATION".to_string(), "collapse".to_string());

        let config = load_config_with_env(file.path(), Some(env)).unwrap();
        assert_eq!(
            config.rail.post_activation,
            PostActivationPolicy::RestartCascade
        );
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.rail.cue, CuePolicy::Indefinite);
    }

    #[test]
    fn test_load_config_missing_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[logging]\nlevel = \"warn\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.rail, RailSettings::default());
        assert_eq!(config.logging.level, "warn");
    }
}
