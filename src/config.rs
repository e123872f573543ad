//! Configuration Module
//!
//! Handles loading server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which recipe store backs the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// MongoDB collection
    Mongo,
    /// In-process store, contents are lost on restart
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Store implementation to use
    pub store_backend: StoreBackend,
    /// MongoDB connection string
    pub mongo_uri: String,
    /// MongoDB database name
    pub database_name: String,
    /// MongoDB collection holding recipe documents
    pub collection_name: String,
    /// Directory receiving normalized images
    pub upload_dir: PathBuf,
    /// Deadline in seconds for each store call
    pub store_timeout_secs: u64,
    /// Deadline in seconds for connecting to the store at startup
    pub connect_timeout_secs: u64,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8081)
    /// - `RECIPE_STORE` - `mongo` or `memory` (default: mongo)
    /// - `MONGO_URI` - connection string (default: mongodb://localhost:27017)
    /// - `MONGO_DATABASE` - database name (default: recipe_db)
    /// - `MONGO_COLLECTION` - collection name (default: recipes)
    /// - `UPLOAD_DIR` - image directory (default: uploads)
    /// - `STORE_TIMEOUT_SECS` - per-call store deadline (default: 5)
    /// - `CONNECT_TIMEOUT_SECS` - startup connect deadline (default: 10)
    /// - `MAX_UPLOAD_BYTES` - request body limit (default: 2 MiB)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            store_backend: parse_var("RECIPE_STORE").unwrap_or(defaults.store_backend),
            mongo_uri: env::var("MONGO_URI").unwrap_or(defaults.mongo_uri),
            database_name: env::var("MONGO_DATABASE").unwrap_or(defaults.database_name),
            collection_name: env::var("MONGO_COLLECTION").unwrap_or(defaults.collection_name),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            store_timeout_secs: parse_var("STORE_TIMEOUT_SECS")
                .unwrap_or(defaults.store_timeout_secs),
            connect_timeout_secs: parse_var("CONNECT_TIMEOUT_SECS")
                .unwrap_or(defaults.connect_timeout_secs),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),
        }
    }

    /// Per-call store deadline.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Startup connect deadline.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8081,
            store_backend: StoreBackend::Mongo,
            mongo_uri: "mongodb://localhost:27017".to_string(),
            database_name: "recipe_db".to_string(),
            collection_name: "recipes".to_string(),
            upload_dir: PathBuf::from("uploads"),
            store_timeout_secs: 5,
            connect_timeout_secs: 10,
            max_upload_bytes: 2 << 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8081);
        assert_eq!(config.store_backend, StoreBackend::Mongo);
        assert_eq!(config.database_name, "recipe_db");
        assert_eq!(config.collection_name, "recipes");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.store_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_upload_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "SERVER_PORT",
            "RECIPE_STORE",
            "MONGO_URI",
            "MONGO_DATABASE",
            "MONGO_COLLECTION",
            "UPLOAD_DIR",
            "STORE_TIMEOUT_SECS",
            "CONNECT_TIMEOUT_SECS",
            "MAX_UPLOAD_BYTES",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.server_port, 8081);
        assert_eq!(config.mongo_uri, "mongodb://localhost:27017");
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!("mongo".parse::<StoreBackend>(), Ok(StoreBackend::Mongo));
        assert_eq!(" Memory ".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert!("redis".parse::<StoreBackend>().is_err());
    }
}
