pub mod collector;
pub mod config;
pub mod db;
pub mod error;
pub mod tibber;

pub use config::Config;
pub use error::{CollectorError, Result};
