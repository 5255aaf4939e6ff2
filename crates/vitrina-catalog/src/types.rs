//! Wire types of the catalog and project endpoints

use serde::{Deserialize, Serialize};
use vitrina_core::material::{MaterialFiles, MaterialKind};
use vitrina_core::{PbrSettings, Preset};

/// One entry of `GET /api/available-materials`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialSummary {
    /// SKU
    pub id: String,
    pub name: String,
    #[serde(rename = "tipo", default)]
    pub kind: Option<MaterialKind>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "formato", default)]
    pub format: Option<String>,
    #[serde(rename = "etiquetas", default)]
    pub tags: Vec<String>,
    /// Preview image path
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(rename = "generatePBR", default)]
    pub generate_pbr: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub files: MaterialFiles,
}

impl MaterialSummary {
    /// Case-insensitive match on SKU, name or color. An empty filter matches all.
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.trim().to_lowercase();
        if filter.is_empty() {
            return true;
        }
        self.id.to_lowercase().contains(&filter)
            || self.name.to_lowercase().contains(&filter)
            || self
                .color
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&filter))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MaterialList {
    #[serde(default)]
    pub materials: Vec<MaterialSummary>,
}

/// One entry of `GET /api/projects`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub presets: Vec<Preset>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Response of `POST /api/upload-temp-model`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempUpload {
    pub success: bool,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub temp_file_name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST /api/projects/create-experience`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceCreated {
    pub success: bool,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST /api/materials/pbr-settings`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PbrSettingsSaved {
    pub success: bool,
    #[serde(default)]
    pub settings: Option<PbrSettings>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Error body returned by the API on failure
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: String,
}
