//! # Server Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKSENCE_PORT=9000                                               │
//! │     STOCKSENCE_JWT_SECRET=...                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/stocksence/server.toml (Linux)                           │
//! │     ~/Library/Application Support/com.stocksence.app/server.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "127.0.0.1"
//! port = 8080
//!
//! [database]
//! path = "./stocksence.db"
//! max_connections = 5
//!
//! [auth]
//! jwt_secret = "change-me"
//! session_lifetime_hours = 24
//!
//! [alerts]
//! duration_ms = 3000
//!
//! [report]
//! utc_offset_minutes = 300
//! ```

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use stocksence_core::alert::DEFAULT_ALERT_DURATION;

/// Secret used when none is configured. `validate` warns about it.
pub const DEV_JWT_SECRET: &str = "stocksence-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to write config file: {0}")]
    Write(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl HttpSettings {
    /// `bind_addr:port`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. When unset, the platform data directory is used.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// How long a sign-in stays valid.
    #[serde(default = "default_session_lifetime")]
    pub session_lifetime_hours: u32,
}

fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}

fn default_session_lifetime() -> u32 {
    24
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            jwt_secret: default_jwt_secret(),
            session_lifetime_hours: default_session_lifetime(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSettings {
    #[serde(default = "default_alert_duration")]
    pub duration_ms: u64,
}

fn default_alert_duration() -> u64 {
    DEFAULT_ALERT_DURATION.as_millis() as u64
}

impl Default for AlertSettings {
    fn default() -> Self {
        AlertSettings {
            duration_ms: default_alert_duration(),
        }
    }
}

impl AlertSettings {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Time zone used for report windows, sale-day filters and CSV dates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Minutes east of UTC (e.g. `-300` for UTC-5).
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl ReportSettings {
    pub fn offset(&self) -> ConfigResult<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "report.utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }
}

// =============================================================================
// Complete Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub alerts: AlertSettings,

    #[serde(default)]
    pub report: ReportSettings,
}

impl ServerConfig {
    /// Loads configuration: defaults, then the TOML file, then environment.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading configuration file");
                let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                config = toml::from_str(&content)?;
            } else {
                debug!(?path, "No configuration file, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// `~/.config/stocksence/server.toml` or the platform equivalent.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stocksence", "app")
            .map(|dirs| dirs.config_dir().join("server.toml"))
    }

    /// `~/.local/share/stocksence/stocksence.db` or the platform equivalent.
    pub fn default_database_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stocksence", "app")
            .map(|dirs| dirs.data_dir().join("stocksence.db"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("STOCKSENCE_BIND_ADDR") {
            debug!(%addr, "Bind address from environment");
            self.server.bind_addr = addr;
        }

        if let Ok(port) = std::env::var("STOCKSENCE_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(%port, "Ignoring invalid STOCKSENCE_PORT"),
            }
        }

        if let Ok(path) = std::env::var("STOCKSENCE_DB_PATH") {
            debug!(%path, "Database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Ok(secret) = std::env::var("STOCKSENCE_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Ok(hours) = std::env::var("STOCKSENCE_SESSION_HOURS") {
            match hours.parse() {
                Ok(hours) => self.auth.session_lifetime_hours = hours,
                Err(_) => warn!(%hours, "Ignoring invalid STOCKSENCE_SESSION_HOURS"),
            }
        }

        if let Ok(offset) = std::env::var("STOCKSENCE_UTC_OFFSET_MINUTES") {
            match offset.parse() {
                Ok(offset) => self.report.utc_offset_minutes = offset,
                Err(_) => warn!(%offset, "Ignoring invalid STOCKSENCE_UTC_OFFSET_MINUTES"),
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must not be 0".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must not be empty".to_string()));
        }

        if self.auth.session_lifetime_hours == 0 {
            return Err(ConfigError::Invalid(
                "auth.session_lifetime_hours must be at least 1".to_string(),
            ));
        }

        if self.alerts.duration_ms == 0 {
            return Err(ConfigError::Invalid("alerts.duration_ms must be positive".to_string()));
        }

        self.report.offset()?;

        if self.auth.jwt_secret == DEV_JWT_SECRET {
            warn!("Using the built-in development JWT secret; set auth.jwt_secret");
        }

        Ok(())
    }

    pub fn save(&self, path: &PathBuf) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(?path, "Configuration saved");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
