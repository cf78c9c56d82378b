use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub storage: StorageConfig,
    pub ingestion: IngestionConfig,
    pub catalog: CatalogConfig,
}

/// Remote provider endpoint and credentials, plus the timezone EPG
/// timestamps are interpreted in when the feed does not say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timezone: String,
}

/// Paths for the bundled local content used before falling back to the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub playlist_path: PathBuf,
    pub schedule_path: PathBuf,
    pub vod_path: PathBuf,
    pub category_names_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Lines per batch handed to the offload channel.
    pub batch_size: usize,
    /// Emit a progress event every N parsed records.
    pub progress_update_interval: usize,
    /// When false, playlists are parsed synchronously on the caller.
    pub use_offload: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Records materialized per group when a category is first opened.
    pub initial_load: usize,
    /// Records appended per load-more trigger.
    pub load_more_count: usize,
    /// Fixed page size for the movies pagination scheme.
    pub movies_per_page: usize,
    /// Pages materialized eagerly when the movies category opens.
    pub movies_eager_pages: usize,
    /// Fraction of remaining scrollable width that triggers a load.
    pub scroll_threshold: f64,
    /// Hovering within this many pages of the last loaded one prefetches.
    pub preload_threshold: usize,
    /// Display name of the rotating event feed.
    pub special_name: String,
    /// Keywords that route a record into the event feed.
    pub special_keywords: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            initial_load: 30,
            load_more_count: 10,
            movies_per_page: 300,
            movies_eager_pages: 2,
            scroll_threshold: 0.8,
            preload_threshold: 2,
            special_name: "BBB 25".to_string(),
            special_keywords: vec!["bbb".to_string(), "big brother".to_string()],
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                base_url: "http://localhost:8080".to_string(),
                username: "user".to_string(),
                password: "pass".to_string(),
                timezone: "America/Sao_Paulo".to_string(),
            },
            storage: StorageConfig {
                playlist_path: PathBuf::from("./assets/epg.m3u"),
                schedule_path: PathBuf::from("./assets/epg.xml"),
                vod_path: PathBuf::from("./assets/epg.json"),
                category_names_path: PathBuf::from("./assets/groups.json"),
            },
            ingestion: IngestionConfig {
                batch_size: 100,
                progress_update_interval: 100,
                use_offload: true,
            },
            catalog: CatalogConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(&config_file, contents)?;
            Ok(default_config)
        }
    }
}
