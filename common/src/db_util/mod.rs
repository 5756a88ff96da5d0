//! Interfaces between the application code and database.

use super::*;
use crate::config::{ConfigError, Settings};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::DatabaseErrorKind;
use std::time::Duration;
use thiserror::Error;

mod annotations;
mod conversions;
mod data_items;
mod labels;
mod schema;
mod snapshots;
mod users;
mod validations;

pub use annotations::*;
pub use data_items::*;
pub use labels::*;
pub use snapshots::*;
pub use users::*;
pub use validations::*;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Invalid(String),
    #[error("Stored value could not be converted: {0}")]
    Conversion(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Could not get a database connection: {0}")]
    Pool(String),
    #[error("Database error: {0}")]
    Database(diesel::result::Error),
}

impl DbError {
    /// Classify a diesel error, naming the missing thing for not-found results
    /// and turning unique-constraint violations into conflicts.
    fn from_diesel(err: diesel::result::Error, what: &str) -> Self {
        match err {
            diesel::result::Error::NotFound => DbError::NotFound(format!("{what} not found.")),
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DbError::Conflict(format!("{what} already exists: {}", info.message()))
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                DbError::Invalid(format!("{what} references a missing row: {}", info.message()))
            }
            other => DbError::Database(other),
        }
    }
}

impl From<diesel::result::Error> for DbError {
    fn from(err: diesel::result::Error) -> Self {
        DbError::from_diesel(err, "Row")
    }
}

/// Open a single connection, used by jobs and scripts.
///
/// # Errors
/// Returns an error if no database is configured or the connection fails.
pub fn get_database_connection(settings: &Settings) -> Result<PgConnection, DbError> {
    let database_url = settings.database_url()?;
    PgConnection::establish(database_url).map_err(|e| DbError::Pool(e.to_string()))
}

/// Build a connection pool and check that the database is reachable.
///
/// # Errors
/// Returns an error if no database is configured or no connection could be made.
pub fn get_database_pool(settings: &Settings) -> Result<PgPool, DbError> {
    let manager = ConnectionManager::<PgConnection>::new(settings.database_url()?);
    Pool::builder()
        .max_size(settings.pool_size)
        .build(manager)
        .map_err(|e| DbError::Pool(e.to_string()))
}

/// Build a connection pool without connecting. Connections are made on first use.
pub fn get_lazy_database_pool(database_url: &str, pool_size: u32) -> PgPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(pool_size)
        .min_idle(Some(0))
        .connection_timeout(Duration::from_secs(5))
        .build_unchecked(manager)
}

/// # Errors
/// Returns an error if the pool timed out waiting for a connection.
pub fn get_pooled_database_connection(pool: &PgPool) -> Result<PgPooledConnection, DbError> {
    pool.get().map_err(|e| DbError::Pool(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_diesel_not_found_names_the_row() {
        let err = DbError::from_diesel(diesel::result::Error::NotFound, "Label #3");
        assert!(matches!(&err, DbError::NotFound(msg) if msg == "Label #3 not found."));
    }

    #[test_log::test]
    fn test_missing_database_url_is_a_config_error() {
        let settings = Settings::default();
        assert!(matches!(
            get_database_pool(&settings),
            Err(DbError::Config(ConfigError::MissingDatabaseUrl))
        ));
    }

    #[test_log::test]
    fn test_lazy_pool_does_not_connect() {
        let pool = get_lazy_database_pool("postgres://nobody@127.0.0.1:1/none", 2);
        assert_eq!(pool.max_size(), 2);
    }
}
