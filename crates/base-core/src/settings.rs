use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{
    ConfigSource, EnvFileSource, ProcessEnvSource, json_list, lenient_bool, merge_sources,
};
use crate::error::ConfigurationError;
use crate::secret::SecretStr;

pub const DEFAULT_PROJECT_NAME: &str = "Base Project";
pub const DEFAULT_PROJECT_VERSION: &str = "0.0.0";

/// Connection descriptor for the Redis cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedisConfig {
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: i64,
}

impl RedisConfig {
    /// `redis://{host}:{port}/{db}`
    pub fn url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.redis_db
        )
    }

    /// Pool configuration pointing at [`RedisConfig::url`].
    pub fn pool_config(&self) -> deadpool_redis::Config {
        deadpool_redis::Config::from_url(self.url())
    }
}

/// Connection descriptor for PostgreSQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub db_echo: bool,
}

/// Process configuration. Built once at startup and never mutated.
///
/// Unknown keys in the sources are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub postgres_host: String,
    pub postgres_port: String,
    pub postgres_db: String,
    pub postgres_password: String,
    pub postgres_user: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub db_echo: bool,

    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: i64,

    pub api_url: String,
    pub bot_token: SecretStr,
    pub log_bot_token: SecretStr,
    #[serde(default, deserialize_with = "json_list")]
    pub maintainers_user_ids: Vec<i64>,

    pub secret_key: String,
    #[serde(default = "default_forwarded_allow_ips", deserialize_with = "json_list")]
    pub forwarded_allow_ips: Vec<String>,

    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub s3_bucket: String,
    pub s3_endpoint_url: String,
    pub s3_domain: String,

    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default = "default_project_version")]
    pub project_version: String,
}

fn default_forwarded_allow_ips() -> Vec<String> {
    vec!["*".to_owned()]
}

fn default_project_name() -> String {
    DEFAULT_PROJECT_NAME.to_owned()
}

fn default_project_version() -> String {
    DEFAULT_PROJECT_VERSION.to_owned()
}

impl Settings {
    /// Load from the default env file, overlaid by the process environment.
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::load_from(default_env_file())
    }

    /// Like [`Settings::load`], reading `env_file` instead of the default location.
    pub fn load_from(env_file: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let file = EnvFileSource::new(env_file.as_ref());
        Self::from_sources(&[&file, &ProcessEnvSource])
    }

    /// Merge `sources` left to right and build settings from the result.
    pub fn from_sources(sources: &[&dyn ConfigSource]) -> Result<Self, ConfigurationError> {
        let merged = merge_sources(sources)?;
        let settings: Self = envy::from_iter(merged)?;
        info!(
            project = %settings.project_name,
            version = %settings.project_version,
            "settings loaded"
        );
        Ok(settings)
    }

    pub fn database_url(&self) -> String {
        format!(
            "postgresql+asyncpg://{}:{}@{}:{}/{}",
            self.postgres_user,
            self.postgres_password,
            self.postgres_host,
            self.postgres_port,
            self.postgres_db
        )
    }

    pub fn base_url(&self) -> String {
        format!("{}/api", self.api_url)
    }

    pub fn redis_config(&self) -> RedisConfig {
        RedisConfig {
            redis_host: self.redis_host.clone(),
            redis_port: self.redis_port,
            redis_db: self.redis_db,
        }
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            database_url: self.database_url(),
            db_echo: self.db_echo,
        }
    }
}

/// `.env` at the workspace root (the nearest ancestor holding `Cargo.lock`),
/// or beside this crate's `src/` when no lockfile is found.
pub fn default_env_file() -> PathBuf {
    let crate_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    crate_dir
        .ancestors()
        .find(|p| p.join("Cargo.lock").exists())
        .unwrap_or(crate_dir)
        .join(".env")
}
