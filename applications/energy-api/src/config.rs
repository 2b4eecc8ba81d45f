use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    /// Shared secret for the /api routes. When unset, all requests pass.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let path = env::var("DATABASE_PATH").unwrap_or_else(|_| "tibber_data.sqlite".to_string());

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = match env::var("SERVER_PORT") {
            Ok(s) => s
                .parse()
                .map_err(|_| config::ConfigError::Message(format!("invalid SERVER_PORT: {}", s)))?,
            Err(_) => 8000,
        };

        let api_key = env::var("API_KEY").ok().filter(|k| !k.is_empty());

        Ok(Config {
            database: DatabaseConfig {
                path,
                max_connections: Some(max_connections),
            },
            server: ServerConfig { host, port },
            api_key,
        })
    }
}
