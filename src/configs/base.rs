use serde::{Deserialize, Serialize};

use crate::{common::ConfigError, configs::*};

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads `config.toml`, then `config.default.toml`, then built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = if std::path::Path::new("config.toml").exists() {
            "config.toml"
        } else if std::path::Path::new("config.default.toml").exists() {
            "config.default.toml"
        } else {
            crate::log_println!("No config file found, using built-in defaults");
            return Ok(Self::default());
        };

        crate::log_println!("Loading configuration from: {}", config_path);
        Self::from_path(config_path)
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)?;
        if config_str.trim().is_empty() {
            return Err(ConfigError::Empty(path.display().to_string()));
        }

        Self::parse(&config_str)
    }

    pub fn parse(config_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(config_str)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::parse(
            r#"
            [player]
            resolve_timeout_ms = 2500

            [resolver]
            ytdlp_path = "bin/yt-dlp"
            "#,
        )
        .unwrap();

        assert_eq!(config.player.resolve_timeout_ms, 2500);
        assert_eq!(config.player.max_consecutive_failures, 5);
        assert_eq!(config.resolver.ytdlp_path, "bin/yt-dlp");
        assert_eq!(config.resolver.search_prefix, "ytsearch1:");
        assert!(config.resolver.http);
        assert_eq!(config.sink.track_duration_ms, 30_000);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_logging_file_section() {
        let config = Config::parse(
            r#"
            [logging]
            level = "debug"

            [logging.file]
            path = "logs/queuelink.log"
            "#,
        )
        .unwrap();

        let file = config.logging.file.expect("file section");
        assert_eq!(file.path, "logs/queuelink.log");
        assert_eq!(file.max_lines, 10_000);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = Config::parse("[player]\nresolve_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let path = std::env::temp_dir().join(format!(
            "queuelink-empty-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "  \n").unwrap();

        let err = Config::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Empty(_)));

        let _ = std::fs::remove_file(&path);
    }
}
