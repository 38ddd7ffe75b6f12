//! Configuration for Trails.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `TRAILS` and nested with `__`
//! (for example `TRAILS__DATABASE__URL`).

use crate::trail::{
    access::AllowAllTrails,
    adapters::postgres::{PostgresTrailRepository, TrailPgPool},
    services::{DEFAULT_RECENT_LIMIT, TrailService},
};
use config::{Config, Environment, File, FileFormat};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Default size of the `PostgreSQL` connection pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

const ENV_PREFIX: &str = "TRAILS";
const ENV_SEPARATOR: &str = "__";

/// Errors raised while loading configuration or acting on it.
#[derive(Debug, Error)]
pub enum TrailsConfigError {
    /// Configuration sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    /// No database URL was configured.
    #[error("database url is not configured")]
    MissingDatabaseUrl,
    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrailsConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Trail service settings.
    pub trails: TrailSettings,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Maximum pooled connections.
    pub max_connections: u32,
}

/// Trail service settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrailSettings {
    /// Number of trails returned by recent listings.
    pub recent_limit: usize,
}

impl TrailsConfig {
    /// Loads configuration from defaults, the optional TOML file at `path`,
    /// and `TRAILS__*` environment variables.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TrailsConfigError::Load`] when a source cannot be parsed or
    /// the merged settings do not deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self, TrailsConfigError> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Parses configuration from a TOML string layered over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TrailsConfigError::Load`] when the string is not valid TOML
    /// or the merged settings do not deserialize.
    pub fn from_toml_str(toml: &str) -> Result<Self, TrailsConfigError> {
        let settings = defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self, TrailsConfigError> {
        let mut builder = defaults()?;
        if let Some(file) = path {
            builder = builder.add_source(File::from(file).format(FileFormat::Toml).required(false));
        }
        let settings = builder
            .add_source(env.separator(ENV_SEPARATOR).try_parsing(true))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Builds a `PostgreSQL`-backed trail service under the schema's
    /// permissive access policy, using the configured recent limit.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`DatabaseConfig::build_pool`].
    pub fn postgres_service(
        &self,
    ) -> Result<TrailService<PostgresTrailRepository, AllowAllTrails>, TrailsConfigError> {
        let repository = PostgresTrailRepository::new(self.database.build_pool()?);
        Ok(
            TrailService::new(Arc::new(repository), Arc::new(AllowAllTrails))
                .with_recent_limit(self.trails.recent_limit),
        )
    }
}

impl DatabaseConfig {
    /// Builds a `PostgreSQL` connection pool from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`TrailsConfigError::MissingDatabaseUrl`] when no URL is set,
    /// or [`TrailsConfigError::Pool`] when the pool cannot be built.
    pub fn build_pool(&self) -> Result<TrailPgPool, TrailsConfigError> {
        let url = self
            .url
            .as_deref()
            .ok_or(TrailsConfigError::MissingDatabaseUrl)?;
        let manager = ConnectionManager::<PgConnection>::new(url);
        let pool = Pool::builder()
            .max_size(self.max_connections)
            .build(manager)?;
        tracing::info!(max_connections = self.max_connections, "built trail connection pool");
        Ok(pool)
    }
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, TrailsConfigError> {
    let recent_limit = i64::try_from(DEFAULT_RECENT_LIMIT).unwrap_or(i64::MAX);
    Ok(Config::builder()
        .set_default("database.max_connections", i64::from(DEFAULT_MAX_CONNECTIONS))?
        .set_default("trails.recent_limit", recent_limit)?)
}
