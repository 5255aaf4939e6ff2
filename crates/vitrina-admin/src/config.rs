//! Configuration loading

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use vitrina_core::{MaterialConventions, NotificationDurations};
use vitrina_scene::SceneConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub materials: MaterialConventions,
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub notifications: NotificationDurations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Catalog and experience backend. Also serves `/materials` and uploaded models.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Public viewer page; experiences are linked as `<link_base>?project=<id>`
    #[serde(default = "default_link_base")]
    pub link_base: String,
    #[serde(default = "default_max_dimension")]
    pub max_model_dimension: f32,
    #[serde(default = "default_true")]
    pub clear_imported_materials: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            link_base: default_link_base(),
            max_model_dimension: default_max_dimension(),
            clear_imported_materials: true,
        }
    }
}

fn default_link_base() -> String {
    "http://localhost:5173/viewer".to_string()
}

fn default_max_dimension() -> f32 {
    5.0
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Viewer settings handed to the scene plugin
    pub fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            asset_base: self.api.base_url.clone(),
            max_model_dimension: self.viewer.max_model_dimension,
            clear_imported_materials: self.viewer.clear_imported_materials,
        }
    }

    /// Browser builds talk to the API named by `?api=`, else to the page's own origin
    pub fn with_page_api(mut self, api_param: Option<String>, origin: Option<String>) -> Self {
        if let Some(base) = api_param.filter(|a| !a.trim().is_empty()).or(origin) {
            self.api.base_url = base;
        }
        self
    }
}

/// Load configuration from file, or defaults if the file does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("Invalid configuration in {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}
