//! Material resources and texture path conventions
//!
//! A material is addressed by its SKU. Its textures live under a fixed directory
//! layout: `{base_path}/{sku}/{sku}_{Channel}{ext}`. The color map is mandatory,
//! every other channel is optional and may simply be missing on the server.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Texture channel of a PBR material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialChannel {
    Color,
    Normal,
    Roughness,
    Metalness,
    #[serde(rename = "ao")]
    AmbientOcclusion,
    Displacement,
}

impl MaterialChannel {
    /// Channels loaded opportunistically next to the color map
    pub const OPTIONAL: [MaterialChannel; 5] = [
        MaterialChannel::Normal,
        MaterialChannel::Roughness,
        MaterialChannel::Metalness,
        MaterialChannel::AmbientOcclusion,
        MaterialChannel::Displacement,
    ];

    /// File name suffix used by the material library
    pub fn suffix(&self) -> &'static str {
        match self {
            MaterialChannel::Color => "_Color",
            MaterialChannel::Normal => "_Normal",
            MaterialChannel::Roughness => "_Roughness",
            MaterialChannel::Metalness => "_Metalness",
            MaterialChannel::AmbientOcclusion => "_AmbientOcclusion",
            MaterialChannel::Displacement => "_Displacement",
        }
    }

    /// Whether the channel stores color data (sRGB) rather than linear data
    pub fn is_srgb(&self) -> bool {
        matches!(self, MaterialChannel::Color)
    }
}

impl std::fmt::Display for MaterialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MaterialChannel::Color => "color",
            MaterialChannel::Normal => "normal",
            MaterialChannel::Roughness => "roughness",
            MaterialChannel::Metalness => "metalness",
            MaterialChannel::AmbientOcclusion => "ao",
            MaterialChannel::Displacement => "displacement",
        };
        write!(f, "{}", name)
    }
}

/// Where material textures are served from and how they are named
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConventions {
    /// Base path of the material library on the server
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Extension of the mandatory color map
    #[serde(default = "default_color_extension")]
    pub color_extension: String,
    /// Extension of every optional map
    #[serde(default = "default_map_extension")]
    pub map_extension: String,
    /// Texture repeats per world unit
    #[serde(default = "default_tiling")]
    pub tiling: f32,
    /// Offset as a fraction of the tiling factor
    #[serde(default = "default_offset_ratio")]
    pub offset_ratio: f32,
}

fn default_base_path() -> String {
    "/materials".to_string()
}

fn default_color_extension() -> String {
    ".png".to_string()
}

fn default_map_extension() -> String {
    ".jpg".to_string()
}

fn default_tiling() -> f32 {
    0.25
}

fn default_offset_ratio() -> f32 {
    0.726
}

impl Default for MaterialConventions {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            color_extension: default_color_extension(),
            map_extension: default_map_extension(),
            tiling: default_tiling(),
            offset_ratio: default_offset_ratio(),
        }
    }
}

impl MaterialConventions {
    fn directory(&self, sku: &str) -> String {
        format!("{}/{}", self.base_path.trim_end_matches('/'), sku)
    }

    /// Path of one channel's texture for a SKU
    pub fn channel_path(&self, sku: &str, channel: MaterialChannel) -> String {
        let ext = if channel == MaterialChannel::Color {
            &self.color_extension
        } else {
            &self.map_extension
        };
        format!("{}/{}{}{}", self.directory(sku), sku, channel.suffix(), ext)
    }

    /// Resolve every texture path a SKU may have
    pub fn resolve(&self, sku: &str) -> TexturePaths {
        TexturePaths {
            color: self.channel_path(sku, MaterialChannel::Color),
            optional: MaterialChannel::OPTIONAL
                .iter()
                .map(|channel| (*channel, self.channel_path(sku, *channel)))
                .collect(),
        }
    }
}

/// Candidate texture files for one SKU
#[derive(Debug, Clone, PartialEq)]
pub struct TexturePaths {
    pub color: String,
    pub optional: BTreeMap<MaterialChannel, String>,
}

impl TexturePaths {
    pub fn get(&self, channel: MaterialChannel) -> Option<&str> {
        if channel == MaterialChannel::Color {
            Some(&self.color)
        } else {
            self.optional.get(&channel).map(String::as_str)
        }
    }
}

/// PBR tuning stored per material on the catalog.
///
/// Numeric values are optional; whoever builds the render material supplies
/// defaults for the ones that are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PbrSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metalness: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ao_intensity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement_scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement_bias: Option<f32>,
    /// Texture repeats per world unit for this material
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiling: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f32>,
    /// Render as the fixed glass material instead of textures
    #[serde(default)]
    pub is_glass: bool,
    #[serde(default = "default_enabled")]
    pub enable_color: bool,
    #[serde(default = "default_enabled")]
    pub enable_normal: bool,
    #[serde(default = "default_enabled")]
    pub enable_roughness: bool,
    #[serde(default = "default_enabled")]
    pub enable_metalness: bool,
    #[serde(default = "default_enabled", rename = "enableAO")]
    pub enable_ao: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for PbrSettings {
    fn default() -> Self {
        Self {
            metalness: None,
            roughness: None,
            normal_scale: None,
            ao_intensity: None,
            displacement_scale: None,
            displacement_bias: None,
            tiling: None,
            offset: None,
            is_glass: false,
            enable_color: true,
            enable_normal: true,
            enable_roughness: true,
            enable_metalness: true,
            enable_ao: true,
        }
    }
}

impl PbrSettings {
    /// Whether a channel may be used. Displacement has no toggle.
    pub fn channel_enabled(&self, channel: MaterialChannel) -> bool {
        match channel {
            MaterialChannel::Color => self.enable_color,
            MaterialChannel::Normal => self.enable_normal,
            MaterialChannel::Roughness => self.enable_roughness,
            MaterialChannel::Metalness => self.enable_metalness,
            MaterialChannel::AmbientOcclusion => self.enable_ao,
            MaterialChannel::Displacement => true,
        }
    }
}

/// Kind of catalog entry. Only textures can be bound to meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialKind {
    #[serde(rename = "textura", alias = "texture")]
    Texture,
    #[serde(rename = "modelo", alias = "model")]
    Model,
}

/// File references per channel, as stored by the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialFiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metalness: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displacement: Option<String>,
}

impl MaterialFiles {
    pub fn get(&self, channel: MaterialChannel) -> Option<&str> {
        match channel {
            MaterialChannel::Color => self.color.as_deref(),
            MaterialChannel::Normal => self.normal.as_deref(),
            MaterialChannel::Roughness => self.roughness.as_deref(),
            MaterialChannel::Metalness => self.metalness.as_deref(),
            MaterialChannel::AmbientOcclusion => self.ao.as_deref(),
            MaterialChannel::Displacement => self.displacement.as_deref(),
        }
    }
}

/// A material record as served by `GET /api/materials/{sku}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialResource {
    #[serde(default, alias = "sku", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "nombre", alias = "name", default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(rename = "formato", alias = "format", default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "etiquetas", alias = "hashtags", default)]
    pub tags: Vec<String>,
    #[serde(rename = "objetos_recomendados", default)]
    pub recommended_objects: Vec<String>,
    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MaterialKind>,
    #[serde(default)]
    pub files: MaterialFiles,
    #[serde(rename = "pbrSettings", default, skip_serializing_if = "Option::is_none")]
    pub pbr_settings: Option<PbrSettings>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Editable subset of a material record, sent with `PUT /api/materials/{sku}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialEdit {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "formato")]
    pub format: String,
    #[serde(rename = "etiquetas")]
    pub tags: Vec<String>,
}

impl MaterialEdit {
    /// Build an edit from form input. Tags are comma separated; blanks are dropped.
    pub fn from_form(name: &str, format: &str, tags: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            format: format.trim().to_string(),
            tags: parse_tags(tags),
        }
    }
}

pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
