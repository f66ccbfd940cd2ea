use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[clap(about = "Grow A Garden stock tracker server", version)]
#[serde(rename_all = "camelCase", default)]
pub struct CliConfig {
    #[clap(long, env = "GARDENSTOCK_PORT", help = "Port for the subscriber operations API.")]
    pub port: Option<u16>,

    #[clap(long, env = "GARDENSTOCK_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "GARDENSTOCK_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "GARDENSTOCK_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "GARDENSTOCK_FEED_URL", help = "Upstream stock feed WebSocket URL.")]
    pub feed_url: Option<String>,

    #[clap(long, env = "GARDENSTOCK_HEARTBEAT_SECONDS", help = "Interval in seconds between keep-alive pings on the feed connection.")]
    pub heartbeat_seconds: Option<u64>,

    #[clap(long, env = "GARDENSTOCK_RECONNECT_DELAY_MS", help = "Fixed delay in milliseconds before a feed reconnect attempt.")]
    pub reconnect_delay_ms: Option<u64>,

    #[clap(long, env = "GARDENSTOCK_WEATHER_URL", help = "Weather lookup endpoint. Empty disables the weather annotation.")]
    pub weather_url: Option<String>,

    #[clap(long, env = "GARDENSTOCK_WEATHER_TIMEOUT_SECONDS", help = "Timeout in seconds for the weather lookup.")]
    pub weather_timeout_seconds: Option<u64>,

    #[clap(long, env = "GARDENSTOCK_DELIVERY_URL", help = "Endpoint notifications are POSTed to.")]
    pub delivery_url: Option<String>,
}

impl CliConfig {
    // Merge two CliConfig structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: CliConfig) -> CliConfig {
        CliConfig {
            port: other.port.or(self.port),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            feed_url: other.feed_url.or(self.feed_url),
            heartbeat_seconds: other.heartbeat_seconds.or(self.heartbeat_seconds),
            reconnect_delay_ms: other.reconnect_delay_ms.or(self.reconnect_delay_ms),
            weather_url: other.weather_url.or(self.weather_url),
            weather_timeout_seconds: other.weather_timeout_seconds.or(self.weather_timeout_seconds),
            delivery_url: other.delivery_url.or(self.delivery_url),
        }
    }

    /// Fills every remaining gap with the built-in defaults.
    fn resolve(self) -> Config {
        Config {
            port: self.port.unwrap_or(9010),
            log_dir: self.log_dir.unwrap_or_else(|| PathBuf::from("./logs")),
            log_level: self.log_level.unwrap_or_else(|| "info".to_string()),
            feed_url: self
                .feed_url
                .unwrap_or_else(|| "wss://gagstock.gleeze.com".to_string()),
            heartbeat_seconds: self.heartbeat_seconds.unwrap_or(10),
            reconnect_delay_ms: self.reconnect_delay_ms.unwrap_or(3000),
            weather_url: self
                .weather_url
                .unwrap_or_else(|| "https://growagardenstock.com/api/stock/weather".to_string()),
            weather_timeout_seconds: self.weather_timeout_seconds.unwrap_or(5),
            delivery_url: self
                .delivery_url
                .unwrap_or_else(|| "http://127.0.0.1:9011/messages".to_string()),
        }
    }
}

/// Fully resolved runtime configuration. Produced once at startup and
/// cloned into every component.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub feed_url: String,
    pub heartbeat_seconds: u64,
    pub reconnect_delay_ms: u64,
    /// Empty string disables the weather annotation entirely.
    pub weather_url: String,
    pub weather_timeout_seconds: u64,
    pub delivery_url: String,
}

pub fn load_config() -> Config {
    // 1. Parse CLI args (which include env vars) early to get a potential
    //    config file path override.
    let cli_args = CliConfig::parse();

    let config_file_path = cli_args
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("server_gardenstock.conf"));

    // 2. Load from the config file if present.
    let mut current_config = CliConfig::default();
    if config_file_path.exists() {
        match fs::read_to_string(&config_file_path) {
            Ok(raw) => match serde_json::from_str::<CliConfig>(&raw) {
                Ok(file_config) => current_config = current_config.merge(file_config),
                Err(e) => log::warn!(
                    "Failed to parse config file {}: {}. Falling back to other sources.",
                    config_file_path.display(),
                    e
                ),
            },
            Err(e) => log::warn!(
                "Failed to read config file {}: {}. Falling back to other sources.",
                config_file_path.display(),
                e
            ),
        }
    }

    // 3. Environment variables and CLI arguments win over the file, and the
    //    defaults fill whatever is still unset.
    current_config.merge(cli_args).resolve()
}
