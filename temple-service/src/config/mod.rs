use crate::models::ReceiptIssuer;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_TEMPLE_NAME: &str = "Shree Doddamma Devi Temple";
pub const DEFAULT_TEMPLE_LOCATION: &str = "Bommenahalli Vaddarahatti, Karnataka, India";
pub const DEFAULT_RECEIVER: &str = "Temple Committee";

#[derive(Debug, Clone)]
pub struct TempleConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub otlp_endpoint: Option<String>,
    pub storage: StorageBackend,
    pub database: Option<DatabaseConfig>,
    /// Balance the account starts with on first boot.
    pub initial_balance: i64,
    pub issuer: ReceiptIssuer,
    /// Principals granted the admin role at startup.
    pub admin_principals: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" => Ok(StorageBackend::Postgres),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

impl Default for ReceiptIssuer {
    fn default() -> Self {
        Self {
            temple_name: DEFAULT_TEMPLE_NAME.to_string(),
            location: DEFAULT_TEMPLE_LOCATION.to_string(),
            receiver: DEFAULT_RECEIVER.to_string(),
        }
    }
}

impl Default for TempleConfig {
    /// In-memory store on an OS-assigned port.
    fn default() -> Self {
        Self {
            common: core_config::Config {
                port: 0,
                ..core_config::Config::default()
            },
            service_name: "temple-service".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: None,
            storage: StorageBackend::Memory,
            database: None,
            initial_balance: 0,
            issuer: ReceiptIssuer::default(),
            admin_principals: Vec::new(),
        }
    }
}

impl TempleConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let storage: StorageBackend = get_env("STORAGE_BACKEND", Some("memory"), false)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let database = match storage {
            StorageBackend::Memory => None,
            StorageBackend::Postgres => Some(DatabaseConfig {
                url: Secret::new(get_env("DATABASE_URL", None, is_prod)?),
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 10)?,
                min_connections: parse_env("DATABASE_MIN_CONNECTIONS", 1)?,
            }),
        };

        let admin_principals = env::var("ADMIN_PRINCIPALS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        Ok(TempleConfig {
            common: common_config,
            service_name: get_env("SERVICE_NAME", Some("temple-service"), false)?,
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
            storage,
            database,
            initial_balance: parse_env("INITIAL_BALANCE", 0)?,
            issuer: ReceiptIssuer {
                temple_name: get_env("TEMPLE_NAME", Some(DEFAULT_TEMPLE_NAME), false)?,
                location: get_env("TEMPLE_LOCATION", Some(DEFAULT_TEMPLE_LOCATION), false)?,
                receiver: get_env("TEMPLE_RECEIVER", Some(DEFAULT_RECEIVER), false)?,
            },
            admin_principals,
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val.trim().parse().map_err(|e: T::Err| {
            AppError::ConfigError(anyhow::anyhow!("{} is not valid: {}", key, e))
        }),
        Err(_) => Ok(default),
    }
}
