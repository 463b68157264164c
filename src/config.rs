use std::{env, fs, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const DEFAULT_CACHE_DIR: &str = ".nevify_cache";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_POSTER_WORKERS: usize = 8;

const CONFIG_FILE: &str = "config.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub image_base_url: String,
    pub cache_dir: Option<String>,
    pub request_timeout_secs: u64,
    pub poster_workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            cache_dir: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            poster_workers: DEFAULT_POSTER_WORKERS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(alias = "api_url")]
    api_base_url: Option<String>,
    image_base_url: Option<String>,
    cache_dir: Option<String>,
    request_timeout_secs: Option<u64>,
    poster_workers: Option<usize>,
}

impl AppConfig {
    fn merge(&mut self, raw: RawConfig, raw_text: &str) {
        if let Some(url) = raw.api_base_url {
            self.api_base_url = trim_base(&url);
            if raw_text.contains("\"api_url\"") {
                warn!("`api_url` is deprecated; rename it to `api_base_url` in config.json.");
            }
        }
        if let Some(url) = raw.image_base_url {
            self.image_base_url = trim_base(&url);
        }
        if raw.cache_dir.is_some() {
            self.cache_dir = raw.cache_dir;
        }
        if let Some(secs) = raw.request_timeout_secs {
            self.request_timeout_secs = secs.max(1);
        }
        if let Some(n) = raw.poster_workers {
            self.poster_workers = n.clamp(1, 32);
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Parse config text over the defaults. Bad JSON keeps the defaults.
pub fn parse_config(raw: &str) -> AppConfig {
    let mut cfg = AppConfig::default();
    match serde_json::from_str::<RawConfig>(raw) {
        Ok(parsed) => cfg.merge(parsed, raw),
        Err(err) => warn!("Failed to parse config.json ({}). Using defaults.", err),
    }
    cfg
}

pub fn load_config() -> AppConfig {
    let cfg_path = PathBuf::from(CONFIG_FILE);

    let mut cfg = match fs::read_to_string(&cfg_path) {
        Ok(raw) => {
            let cfg = parse_config(&raw);
            info!("Loaded config from {}", cfg_path.display());
            cfg
        }
        Err(_) => {
            info!("No config.json found; using defaults");
            AppConfig::default()
        }
    };

    if let Ok(url) = env::var("NEVIFY_API_URL") {
        if !url.trim().is_empty() {
            cfg.api_base_url = trim_base(&url);
        }
    }

    cfg
}

/// Resolve a relative path against the current working directory.
pub fn resolve_relative_path(rel: &str) -> String {
    env::current_dir()
        .map(|dir| dir.join(rel))
        .unwrap_or_else(|_| PathBuf::from(rel))
        .to_string_lossy()
        .into_owned()
}
