//! Configuration management for headline-sync.
//!
//! Configuration is read from `~/.config/headline-sync/config.toml`.
//! If the file doesn't exist, a default configuration with comments is created.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
}

/// Paging and refresh cadence.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Articles requested from the provider per refresh (default: 100)
    pub page_size: usize,
    /// Articles shown right after a refresh (default: 10)
    pub initial_batch: usize,
    /// Articles merged on each scheduled tick (default: 5)
    pub incremental_batch: usize,
    /// Seconds between scheduled ticks (default: 5)
    pub interval_secs: u64,
    /// Whether the scheduler ticks as soon as it starts (default: true)
    pub tick_on_start: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            initial_batch: 10,
            incremental_batch: 5,
            interval_secs: 5,
            tick_on_start: true,
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub country: String,
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org/v2".to_string(),
            country: "us".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite file holding the snapshot (default: `<data dir>/headline-sync/cache.db`)
    pub path: Option<PathBuf>,
    /// Name the snapshot blob is stored under
    pub key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: "HEADLINES".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(config_path)
    }

    pub fn load_from(config_path: PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/headline-sync/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("headline-sync").join("config.toml"))
    }

    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    fn default_config_content() -> String {
        r##"# headline-sync configuration

[sync]
# Articles requested from the provider on each refresh
page_size = 100

# Articles shown right after a refresh
initial_batch = 10

# Articles merged into the list on each scheduled tick
incremental_batch = 5

# Seconds between scheduled ticks
interval_secs = 5

# Tick immediately when the scheduler starts
tick_on_start = true

[provider]
base_url = "https://newsapi.org/v2"
country = "us"
# api_key = "your-key"
timeout_secs = 10

[cache]
# path = "/var/lib/headline-sync/cache.db"
key = "HEADLINES"
"##
        .to_string()
    }
}

/// Parse interval string like "5s", "30m", "6h", "1d" or bare seconds.
pub fn parse_interval(s: &str) -> Result<u64, String> {
    let s = s.trim().to_lowercase();

    if let Some(hours) = s.strip_suffix('h') {
        hours
            .parse::<u64>()
            .map(|h| h * 3600)
            .map_err(|_| format!("Invalid hours: {}", hours))
    } else if let Some(minutes) = s.strip_suffix('m') {
        minutes
            .parse::<u64>()
            .map(|m| m * 60)
            .map_err(|_| format!("Invalid minutes: {}", minutes))
    } else if let Some(days) = s.strip_suffix('d') {
        days.parse::<u64>()
            .map(|d| d * 86400)
            .map_err(|_| format!("Invalid days: {}", days))
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>()
            .map_err(|_| format!("Invalid seconds: {}", secs))
    } else {
        s.parse::<u64>()
            .map_err(|_| format!("Invalid interval: {}. Use format like '5s', '1m', '1h'", s))
    }
}

/// Format interval for display
pub fn format_interval(secs: u64) -> String {
    if secs >= 86400 && secs.is_multiple_of(86400) {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs.is_multiple_of(3600) {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs.is_multiple_of(60) {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.sync.page_size, 100);
        assert_eq!(config.sync.initial_batch, 10);
        assert_eq!(config.sync.incremental_batch, 5);
        assert_eq!(config.provider.country, "us");
        assert!(config.provider.api_key.is_none());
        assert_eq!(config.cache.key, "HEADLINES");
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[sync]
interval_secs = 60

[provider]
api_key = "abc"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.sync.interval(), Duration::from_secs(60));
        assert_eq!(config.provider.api_key.as_deref(), Some("abc"));
        // Defaults fill the rest
        assert_eq!(config.sync.incremental_batch, 5);
        assert_eq!(config.provider.base_url, "https://newsapi.org/v2");
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.sync.interval_secs, 5);
        assert!(config.sync.tick_on_start);
        assert!(config.cache.path.is_none());
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sync]\npage_size = \"lots\"\n").unwrap();

        let err = Config::load_from(path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("5s").unwrap(), 5);
        assert_eq!(parse_interval("30m").unwrap(), 1800);
        assert_eq!(parse_interval("1h").unwrap(), 3600);
        assert_eq!(parse_interval("1d").unwrap(), 86400);
        assert_eq!(parse_interval("300").unwrap(), 300);
        assert!(parse_interval("soon").is_err());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(5), "5s");
        assert_eq!(format_interval(300), "5m");
        assert_eq!(format_interval(7200), "2h");
        assert_eq!(format_interval(86400), "1d");
        assert_eq!(format_interval(90), "90s");
    }
}
