use crate::error::{CollectorError, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub tibber_token: String,
    pub tibber_home_id: Option<String>,
    pub database_path: String,
    pub api_url: String,
    pub lookback_days: i64,
    pub page_size: i64,
    pub collect_interval_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let tibber_token = env::var("TIBBER_TOKEN")
            .map_err(|_| CollectorError::Config("TIBBER_TOKEN must be set".to_string()))?;

        Ok(Config {
            tibber_token,
            tibber_home_id: env::var("TIBBER_HOME_ID").ok().filter(|v| !v.is_empty()),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "tibber_data.sqlite".to_string()),
            api_url: env::var("TIBBER_API_URL")
                .unwrap_or_else(|_| "https://api.tibber.com/v1-beta/gql".to_string()),
            lookback_days: env::var("LOOKBACK_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(90),
            page_size: env::var("PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
            collect_interval_secs: env::var("COLLECT_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),
        })
    }
}
