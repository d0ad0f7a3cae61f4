//! Runtime configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} is not a valid byte count: {value}")]
    InvalidSize { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub storage_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// Public base URL used when building image links
    pub api_url: String,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Load `.env` if present, then read `LOGISTICS_*` variables
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_path = lookup("LOGISTICS_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("logistics-storage"));

        let database_path = lookup("LOGISTICS_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| storage_path.join("logistics.db"));

        let raw_addr =
            lookup("LOGISTICS_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr.parse().map_err(|_| ConfigError::InvalidAddr {
            var: "LOGISTICS_BIND_ADDR",
            value: raw_addr.clone(),
        })?;

        let api_url = lookup("LOGISTICS_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://{}", bind_addr));

        let max_upload_bytes = match lookup("LOGISTICS_MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidSize {
                var: "LOGISTICS_MAX_UPLOAD_BYTES",
                value: raw,
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            database_path,
            storage_path,
            bind_addr,
            api_url,
            max_upload_bytes,
        })
    }

    /// Configuration rooted in a scratch directory, for tests
    #[cfg(test)]
    pub fn for_storage(storage_path: PathBuf) -> Self {
        Self {
            database_path: storage_path.join("logistics.db"),
            storage_path,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            api_url: "http://testserver".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8000");
        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
        assert!(config.storage_path.ends_with("logistics-storage"));
        assert_eq!(config.database_path, config.storage_path.join("logistics.db"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("LOGISTICS_STORAGE_PATH", "/srv/logistics"),
            ("LOGISTICS_BIND_ADDR", "0.0.0.0:9000"),
            ("LOGISTICS_API_URL", "https://maps.example.org/"),
            ("LOGISTICS_MAX_UPLOAD_BYTES", "1024"),
        ])
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/srv/logistics/logistics.db"));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.api_url, "https://maps.example.org");
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("LOGISTICS_BIND_ADDR", "nowhere")]),
            Err(ConfigError::InvalidAddr { .. })
        ));
        assert!(matches!(
            load(&[("LOGISTICS_MAX_UPLOAD_BYTES", "lots")]),
            Err(ConfigError::InvalidSize { .. })
        ));
    }
}
