/// Configuration loading for the entry form.
///
/// Settings come from an optional TOML file (`athus.toml` by default), then
/// environment overrides. A `.env` file in the working directory is loaded
/// first so the store key never has to live in the TOML file or the source.
///
/// Recognized environment variables:
///   ATHUS_STORE_URL  → store.endpoint
///   ATHUS_STORE_KEY  → store.api_key
///   ATHUS_TABLE      → store.table
///   DATABASE_URL     → store.database_url

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::logging::LogLevel;
use crate::model::DEFAULT_TABLE;

pub const DEFAULT_CONFIG_PATH: &str = "./athus.toml";

/// Log file used when the config names none. Failed submissions are only
/// recorded there.
pub const DEFAULT_LOG_FILE: &str = "athus_form.log";

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// Which store the readings are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hosted REST interface (Supabase / PostgREST).
    #[default]
    Rest,
    /// Direct Postgres connection.
    Postgres,
    /// In-process store; nothing leaves the machine.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: Backend,
    /// Project URL, e.g. "https://<project>.supabase.co".
    pub endpoint: Option<String>,
    /// Project access key sent as `apikey` and bearer token.
    pub api_key: Option<String>,
    /// Target table.
    pub table: String,
    /// Connection string for the Postgres backend.
    pub database_url: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: Backend::Rest,
            endpoint: None,
            api_key: None,
            table: DEFAULT_TABLE.to_string(),
            database_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// "debug" | "info" | "warn" | "error"
    pub level: String,
    /// Append log lines to this file as well as the console. Submission
    /// failure detail goes here and nowhere else.
    pub file: Option<String>,
    /// Print full timestamped entries on the console.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: Some(DEFAULT_LOG_FILE.to_string()),
            timestamps: false,
        }
    }
}

impl LoggingConfig {
    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.level
            .parse::<LogLevel>()
            .map_err(|e: String| ConfigError::Invalid(format!("logging.level: {}", e)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io(String),
    /// The config file is not valid TOML for `AppConfig`.
    Parse(String),
    /// A setting the selected backend needs is absent.
    Missing(&'static str),
    /// The table name is not a bare SQL identifier.
    InvalidTable(String),
    /// Any other out-of-range value.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Cannot read configuration: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Cannot parse configuration: {}", msg),
            ConfigError::Missing(key) => write!(f, "Missing configuration value: {}", key),
            ConfigError::InvalidTable(name) => write!(f, "Invalid table name: '{}'", name),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parses configuration from TOML text. Missing sections take defaults.
pub fn from_toml_str(text: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Reads `path` if it exists; a missing file yields the defaults.
pub fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
    from_toml_str(&text)
}

/// Applies environment overrides using `lookup` to read variables.
///
/// Empty values are ignored, so `ATHUS_STORE_KEY=` in a `.env` does not
/// erase a key set in the file.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get("ATHUS_STORE_URL") {
        config.store.endpoint = Some(url);
    }
    if let Some(key) = get("ATHUS_STORE_KEY") {
        config.store.api_key = Some(key);
    }
    if let Some(table) = get("ATHUS_TABLE") {
        config.store.table = table;
    }
    if let Some(url) = get("DATABASE_URL") {
        config.store.database_url = Some(url);
    }
}

/// Returns `true` for `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Checks that the selected backend has everything it needs.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let store = &config.store;

    if !is_plain_identifier(&store.table) {
        return Err(ConfigError::InvalidTable(store.table.clone()));
    }

    match store.backend {
        Backend::Rest => {
            if store.endpoint.is_none() {
                return Err(ConfigError::Missing("store.endpoint (ATHUS_STORE_URL)"));
            }
            if store.api_key.is_none() {
                return Err(ConfigError::Missing("store.api_key (ATHUS_STORE_KEY)"));
            }
        }
        Backend::Postgres => {
            if store.database_url.is_none() {
                return Err(ConfigError::Missing("store.database_url (DATABASE_URL)"));
            }
        }
        Backend::Memory => {}
    }

    config.logging.log_level()?;
    Ok(())
}

/// Loads `.env`, the config file, and the process environment, then validates.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    dotenv::dotenv().ok();

    let mut config = read_config_file(path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
