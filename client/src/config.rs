use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub data_dir: PathBuf,
    pub keyring_service: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("IPARENTAL_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.iparental.app/api".to_string());

        let timeout_value =
            env::var("IPARENTAL_API_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());
        let request_timeout_secs = timeout_value
            .parse()
            .map_err(|_| anyhow!("Invalid IPARENTAL_API_TIMEOUT_SECS value: {}", timeout_value))?;

        let data_dir = env::var("IPARENTAL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./iparental-data"));

        let keyring_service = env::var("IPARENTAL_KEYRING_SERVICE")
            .unwrap_or_else(|_| "app.iparental.credentials".to_string());

        Ok(Config {
            api_base_url,
            request_timeout_secs,
            data_dir,
            keyring_service,
        })
    }

    /// Request timeout applied to every gateway call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
