use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

impl DatabaseSettings {
    pub fn max_connections(&self) -> u32 {
        self.max_connections.unwrap_or(10)
    }

    pub fn min_connections(&self) -> u32 {
        self.min_connections.unwrap_or(1)
    }
}

/// Which store backs the swipe engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl LoggingSettings {
    /// Apply `LOG_LEVEL` / `LOG_FORMAT` on top of the configured values
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::var("LOG_LEVEL").ok(), std::env::var("LOG_FORMAT").ok())
    }

    fn with_overrides(self, level: Option<String>, format: Option<String>) -> Self {
        Self {
            level: level.filter(|l| !l.is_empty()).unwrap_or(self.level),
            format: format.filter(|f| !f.is_empty()).unwrap_or(self.format),
        }
    }

    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Configuration file (config/default.toml)
    /// 2. Local overrides (config/local.toml)
    /// 3. Environment variables (prefixed with SUPERDATE__)
    /// 4. `DATABASE_URL`, `JWT_SECRET` and `PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SUPERDATE__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SUPERDATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        apply_env_overrides(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SUPERDATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the conventional unprefixed variables on top of the layered config
fn apply_env_overrides(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }
    if let Ok(port) = env::var("PORT") {
        let port: i64 = port
            .parse()
            .map_err(|_| ConfigError::Message(format!("PORT is not a number: {}", port)))?;
        builder = builder.set_override("server.port", port)?;
    }

    builder.build()
}
