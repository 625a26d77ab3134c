use std::path::PathBuf;

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Configuration for the application
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    /// Root directory of the local object store
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// Prefix of the URLs handed out for stored files
    #[serde(default = "default_storage_public_url")]
    pub storage_public_url: String,
    /// Hourly rate applied to billable logs that carry none
    #[serde(default = "default_bill_rate")]
    pub default_bill_rate: f64,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_max_connections() -> u32 {
    5
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("storage")
}

fn default_storage_public_url() -> String {
    "http://localhost:8080/api/v1/storage/download".to_string()
}

fn default_bill_rate() -> f64 {
    100.0
}

fn default_log_file() -> PathBuf {
    PathBuf::from("archflow.log")
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first if one exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Deserialize configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars)?;
        Ok(config)
    }

    /// Get a direct reference to the database URL
    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = Config::from_vars(vars(&[("DATABASE_URL", "postgres://localhost/archflow")])).unwrap();
        assert_eq!(config.database_url(), "postgres://localhost/archflow");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.storage_dir, PathBuf::from("storage"));
        assert_eq!(config.default_bill_rate, 100.0);
        assert_eq!(config.log_file, PathBuf::from("archflow.log"));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "postgres://db/archflow"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("DEFAULT_BILL_RATE", "150.5"),
            ("STORAGE_PUBLIC_URL", "https://files.example.com"),
        ]))
        .unwrap();
        assert_eq!(config.database_max_connections, 12);
        assert_eq!(config.default_bill_rate, 150.5);
        assert_eq!(config.storage_public_url, "https://files.example.com");
    }

    #[test]
    fn database_url_is_required() {
        assert!(Config::from_vars(Vec::new()).is_err());
    }
}
