//! Runtime settings read from the environment (and `.env` if present).

use crate::DataType;
use itertools::Itertools;
use std::env;
use thiserror::Error;

pub const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,
    #[error("LABELING_DATA_TYPES contains an unknown data type: {0}")]
    UnknownDataType(String),
    #[error("LABELING_DATA_TYPES must enable at least one data type")]
    NoDataTypes,
    #[error("LABELING_DB_POOL_SIZE must be a positive integer, got {0}")]
    InvalidPoolSize(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: Option<String>,
    /// Data types new items may be created with. Some deployments drop `image`.
    pub enabled_data_types: Vec<DataType>,
    pub pool_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            enabled_data_types: DataType::ALL.to_vec(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}

impl Settings {
    /// Load `.env` if there is one, then read the process environment.
    ///
    /// # Errors
    /// Returns an error if any variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup, e.g. a map in tests.
    ///
    /// # Errors
    /// Returns an error if any variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Settings {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            ..Settings::default()
        };
        if let Some(raw) = lookup("LABELING_DATA_TYPES") {
            settings.enabled_data_types = parse_data_types(&raw)?;
        }
        if let Some(raw) = lookup("LABELING_DB_POOL_SIZE") {
            settings.pool_size = match raw.trim().parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => return Err(ConfigError::InvalidPoolSize(raw)),
            };
        }
        log::debug!(
            "Loaded settings: data types [{}], pool size {}",
            settings.enabled_data_types.iter().join(", "),
            settings.pool_size
        );
        Ok(settings)
    }

    /// # Errors
    /// Returns `ConfigError::MissingDatabaseUrl` if no database was configured.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::MissingDatabaseUrl)
    }

    pub fn accepts(&self, data_type: DataType) -> bool {
        self.enabled_data_types.contains(&data_type)
    }
}

/// Parse a comma-separated list of data types, dropping duplicates.
///
/// # Errors
/// Returns an error for unknown names or an empty list.
pub fn parse_data_types(raw: &str) -> Result<Vec<DataType>, ConfigError> {
    let data_types: Vec<DataType> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<DataType>()
                .map_err(|_| ConfigError::UnknownDataType(s.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .unique()
        .collect();
    if data_types.is_empty() {
        return Err(ConfigError::NoDataTypes);
    }
    Ok(data_types)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test_log::test]
    fn test_defaults_enable_every_data_type() {
        let settings = settings_from(&[]).unwrap();
        assert_eq!(settings.enabled_data_types, DataType::ALL.to_vec());
        assert_eq!(settings.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(settings.database_url(), Err(ConfigError::MissingDatabaseUrl));
    }

    #[test_log::test]
    fn test_image_can_be_disabled() {
        let settings = settings_from(&[("LABELING_DATA_TYPES", "text, audio")]).unwrap();
        assert!(!settings.accepts(DataType::Image));
        assert!(settings.accepts(DataType::Text));
        assert!(settings.accepts(DataType::Audio));
    }

    #[test_log::test]
    fn test_unknown_data_type_is_rejected() {
        assert_eq!(
            settings_from(&[("LABELING_DATA_TYPES", "text,video")]),
            Err(ConfigError::UnknownDataType("video".to_string()))
        );
        assert_eq!(parse_data_types(" , "), Err(ConfigError::NoDataTypes));
    }

    #[test_log::test]
    fn test_duplicate_data_types_collapse() {
        assert_eq!(
            parse_data_types("text,TEXT,audio").unwrap(),
            vec![DataType::Text, DataType::Audio]
        );
    }

    #[test_log::test]
    fn test_pool_size_and_database_url() {
        let settings = settings_from(&[
            ("DATABASE_URL", "postgres://localhost/labeling"),
            ("LABELING_DB_POOL_SIZE", "4"),
        ])
        .unwrap();
        assert_eq!(settings.pool_size, 4);
        assert_eq!(settings.database_url(), Ok("postgres://localhost/labeling"));
        assert!(matches!(
            settings_from(&[("LABELING_DB_POOL_SIZE", "0")]),
            Err(ConfigError::InvalidPoolSize(_))
        ));
    }
}
