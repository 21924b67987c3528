use std::path::PathBuf;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub library: LibraryConfig,
    pub network: NetworkConfig,
    pub refresh: RefreshConfig,
    pub stats: StatsConfig,
    pub browse: BrowseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LibraryConfig {
    pub api_url: String,
    /// Default user for loan statistics when `--user` is not given
    pub user_id: Option<i64>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            user_id: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    pub carousel_interval_secs: u64,
    pub catalog_refresh_mins: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            carousel_interval_secs: 3,
            catalog_refresh_mins: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatsConfig {
    pub top_n: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { top_n: 3 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowseConfig {
    /// Categories offered by the picker, after "All books"
    pub categories: Vec<String>,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

const DEFAULT_CATEGORIES: [&str; 4] = ["文學小說", "漫畫", "程式設計", "心理勵志"];

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present)
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shelf-monitor");

        let builder = Config::builder()
            // 1. Load default values
            // Library
            .set_default("library.api_url", LibraryConfig::default().api_url)?
            .set_default("library.user_id", None::<i64>)?
            // Network
            .set_default("network.request_timeout_secs", 30)?
            .set_default("network.connect_timeout_secs", 10)?
            // Refresh
            .set_default("refresh.carousel_interval_secs", 3)?
            .set_default("refresh.catalog_refresh_mins", 30)?
            // Stats
            .set_default("stats.top_n", 3)?
            // Browse
            .set_default("browse.categories", DEFAULT_CATEGORIES.to_vec())?

            // 2. Load from local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))

            // 3. Load from user config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))

            // 4. Load from Environment variables (SHELF__STATS__TOP_N=...)
            .add_source(Environment::with_prefix("SHELF").separator("__"));

        let s = builder.build()?;
        Ok(s.try_deserialize()?)
    }
}
