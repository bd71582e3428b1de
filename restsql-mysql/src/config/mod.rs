//! Connector settings loaded from YAML files, `.env` files, and the environment.

mod loader;
pub mod secrets;
pub mod value;

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use tracing::debug;

pub use secrets::{resolve_placeholders, DefaultSecretResolver, SecretResolver};
pub use value::{ConfigValue, FromConfigValue};

pub const DATABASE_URL: &str = "restsql.database.url";
pub const MAX_CONNECTIONS: &str = "restsql.database.max_connections";
pub const ACQUIRE_TIMEOUT_SECS: &str = "restsql.database.acquire_timeout_secs";
pub const LOG_STATEMENTS: &str = "restsql.log_statements";

const KNOWN_KEYS: &[&str] = &[DATABASE_URL, MAX_CONNECTIONS, ACQUIRE_TIMEOUT_SECS, LOG_STATEMENTS];

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// A required key, or a referenced variable, is absent.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for [`connect`](crate::connect).
///
/// Resolution order (lowest to highest priority):
/// 1. `restsql.yaml`
/// 2. `restsql-{profile}.yaml`
/// 3. `.env`, then `.env.{profile}` (loaded into the process environment)
/// 4. Environment variables named after the key (`RESTSQL_DATABASE_URL` for
///    `restsql.database.url`)
///
/// `.env` files never overwrite variables that are already set. `${...}`
/// placeholders in YAML strings are resolved before the environment overlay.
/// The profile comes from `RESTSQL_PROFILE`, falling back to the argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub log_statements: bool,
}

impl ConnectorConfig {
    /// Defaults for everything but the URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            log_statements: true,
        }
    }

    /// Load from the current working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."), profile)
    }

    /// Load from the files in `dir`, using the default secret resolver.
    pub fn load_from_dir(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        Self::load_with_resolver(dir, profile, &DefaultSecretResolver)
    }

    pub fn load_with_resolver(
        dir: &Path,
        profile: &str,
        resolver: &dyn SecretResolver,
    ) -> Result<Self, ConfigError> {
        let active_profile =
            std::env::var("RESTSQL_PROFILE").unwrap_or_else(|_| profile.to_string());
        debug!(profile = %active_profile, dir = %dir.display(), "Loading connector config");

        let mut values = HashMap::new();
        loader::load_yaml_file(&dir.join("restsql.yaml"), &mut values)?;
        loader::load_yaml_file(&dir.join(format!("restsql-{active_profile}.yaml")), &mut values)?;

        // Missing .env files are not an error.
        let _ = dotenvy::from_path(dir.join(".env"));
        let _ = dotenvy::from_path(dir.join(format!(".env.{active_profile}")));

        resolve_string_values(&mut values, resolver)?;

        for key in KNOWN_KEYS {
            if let Ok(env_val) = std::env::var(env_name(key)) {
                values.insert((*key).to_string(), ConfigValue::String(env_val));
            }
        }

        Self::from_values(&values)
    }

    /// Parse a YAML document directly. No files or environment are read.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Self::from_values(&values)
    }

    fn from_values(values: &HashMap<String, ConfigValue>) -> Result<Self, ConfigError> {
        let defaults = Self::new(String::new());
        Ok(Self {
            database_url: require(values, DATABASE_URL)?,
            max_connections: get_or(values, MAX_CONNECTIONS, defaults.max_connections)?,
            acquire_timeout: Duration::from_secs(get_or(
                values,
                ACQUIRE_TIMEOUT_SECS,
                defaults.acquire_timeout.as_secs(),
            )?),
            log_statements: get_or(values, LOG_STATEMENTS, defaults.log_statements)?,
        })
    }
}

/// `restsql.database.url` -> `RESTSQL_DATABASE_URL`
pub fn env_name(key: &str) -> String {
    key.to_uppercase().replace('.', "_")
}

fn require<V: FromConfigValue>(
    values: &HashMap<String, ConfigValue>,
    key: &str,
) -> Result<V, ConfigError> {
    match values.get(key) {
        None | Some(ConfigValue::Null) => Err(ConfigError::NotFound(key.to_string())),
        Some(value) => V::from_config_value(value, key),
    }
}

fn get_or<V: FromConfigValue>(
    values: &HashMap<String, ConfigValue>,
    key: &str,
    default: V,
) -> Result<V, ConfigError> {
    match values.get(key) {
        None | Some(ConfigValue::Null) => Ok(default),
        Some(value) => V::from_config_value(value, key),
    }
}

fn resolve_string_values(
    values: &mut HashMap<String, ConfigValue>,
    resolver: &dyn SecretResolver,
) -> Result<(), ConfigError> {
    for value in values.values_mut() {
        if let ConfigValue::String(s) = value {
            if s.contains("${") {
                *s = resolve_placeholders(s, resolver)?;
            }
        }
    }
    Ok(())
}
