//! Configuration schema for recym-cache
//!
//! Configuration is stored at `~/.config/recym/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Partition and routing settings
    pub cache: CacheConfig,

    /// Network settings
    pub network: NetworkConfig,

    /// Push notification settings
    pub notifications: NotificationsConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,

    /// Append lifecycle events to the journal
    pub journal: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
            journal: true,
        }
    }
}

/// Cache partition and routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Partition name prefix
    pub prefix: String,

    /// Deployed version, embedded in partition names
    pub version: String,

    /// Resources fetched on install and served cache-first
    pub static_files: Vec<String>,

    /// Path suffixes of 3D model files served cache-first
    pub model_extensions: Vec<String>,

    /// Path prefix of API calls served network-first
    pub api_prefix: String,

    /// Partition store directory (defaults to the state directory)
    pub store_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: "recym".to_string(),
            version: "1.0.0".to_string(),
            static_files: [
                "/",
                "/index.html",
                "/styles.css",
                "/script.js",
                "/manifest.json",
                "/Assets/visor.webp",
                "/Assets/cover.jpg",
                "/Assets/rack3.glb",
                "/Assets/rack.usdz",
                "https://unpkg.com/@google/model-viewer/dist/model-viewer.min.js",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            model_extensions: vec![".glb".to_string(), ".usdz".to_string()],
            api_prefix: "/api/".to_string(),
            store_dir: None,
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Base URL relative requests resolve against
    pub origin: String,

    /// Overall request timeout in seconds (0 = none)
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            timeout_secs: 0,
            user_agent: format!("recym-cache/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Push notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Icon shown on the notification and its actions
    pub icon: String,

    /// Badge shown on the notification
    pub badge: String,

    /// Vibration pattern in milliseconds
    pub vibrate: Vec<u32>,

    /// Title of the "explore" action
    pub explore_title: String,

    /// Title of the "close" action
    pub close_title: String,

    /// Page opened when the "explore" action is clicked
    pub open_url: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            icon: "/Assets/visor.webp".to_string(),
            badge: "/Assets/visor.webp".to_string(),
            vibrate: vec![100, 50, 100],
            explore_title: "Ver en AR".to_string(),
            close_title: "Cerrar".to_string(),
            open_url: "/".to_string(),
        }
    }
}
