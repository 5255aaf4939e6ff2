//! Shared resources, components and messages of the viewer

use bevy::prelude::*;
use std::collections::HashMap;
use vitrina_catalog::CatalogClient;
use vitrina_core::{Intent, LoadedModel, MeshId, Notification, PresetOrchestrator};

/// Viewer settings that do not belong to the orchestrator
#[derive(Debug, Clone, Resource)]
pub struct SceneConfig {
    /// Origin serving models and material textures
    pub asset_base: String,
    /// Largest dimension of a freshly loaded model after fitting
    pub max_model_dimension: f32,
    /// Swap the file's own materials for the placeholder on load
    pub clear_imported_materials: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_base: "http://localhost:3000".to_string(),
            max_model_dimension: 5.0,
            clear_imported_materials: true,
        }
    }
}

impl SceneConfig {
    /// Absolute URL for a server-relative path. Absolute URLs pass through.
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") || self.asset_base.is_empty() {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.asset_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Ordering of the viewer's update systems
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ViewerSet {
    Load,
    Input,
    Apply,
}

/// Ask the viewer to replace the current model with the one at `path`
#[derive(Message, Debug, Clone)]
pub struct LoadModel {
    pub path: String,
}

#[derive(Debug, Clone, Default)]
pub enum ModelState {
    #[default]
    Empty,
    Loading(Handle<Gltf>),
    /// Scene spawned, waiting for its entities
    Spawning,
    Ready,
    Failed(String),
}

/// Renderer side of one registered mesh
#[derive(Debug, Clone)]
pub struct MeshEntity {
    pub entity: Entity,
    /// Per-entity copies, so edits never leak to other instances
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
    /// Vertex positions and normals in viewer space, for box projection
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub original_uvs: Option<Vec<[f32; 2]>>,
}

/// The model on screen and its mapping to entities
#[derive(Resource, Default)]
pub struct ViewerModel {
    pub model: LoadedModel,
    /// Server path the model was loaded from
    pub source: Option<String>,
    pub state: ModelState,
    pub root: Option<Entity>,
    pub entities: HashMap<MeshId, MeshEntity>,
    /// Transform applied to the root to centre and scale the model
    pub root_transform: Transform,
    /// Materials that came with the file, indexed by `MaterialSlot::Imported::index`
    pub imported: Vec<Handle<StandardMaterial>>,
}

impl ViewerModel {
    pub fn is_ready(&self) -> bool {
        matches!(self.state, ModelState::Ready)
    }

    /// Forget the current model. The caller despawns the root.
    pub fn clear(&mut self) {
        self.model = LoadedModel::new();
        self.source = None;
        self.state = ModelState::Empty;
        self.root = None;
        self.entities.clear();
        self.root_transform = Transform::IDENTITY;
        self.imported.clear();
    }
}

/// Marker for the entity holding the loaded scene
#[derive(Component)]
pub struct ModelRoot;

/// The binding/preset orchestrator
#[derive(Resource, Default, Deref, DerefMut)]
pub struct Presets(pub PresetOrchestrator);

/// Intents queued by input and UI systems, dispatched once per frame
#[derive(Resource, Default)]
pub struct PendingIntents(pub Vec<Intent>);

impl PendingIntents {
    pub fn push(&mut self, intent: Intent) {
        self.0.push(intent);
    }
}

/// Viewer messages for the user (model load results)
#[derive(Resource, Default)]
pub struct SceneNotifications(pub Vec<Notification>);

/// Catalog client used for preview configs
#[derive(Resource, Clone, Deref)]
pub struct Catalog(pub CatalogClient);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_url() {
        let config = SceneConfig::default();
        assert_eq!(
            config.asset_url("/materials/TILE_001/TILE_001_Color.png"),
            "http://localhost:3000/materials/TILE_001/TILE_001_Color.png"
        );
        assert_eq!(
            config.asset_url("https://cdn.example.com/room.glb"),
            "https://cdn.example.com/room.glb"
        );
    }

    #[test]
    fn test_asset_url_same_origin() {
        let config = SceneConfig {
            asset_base: String::new(),
            ..default()
        };
        assert_eq!(config.asset_url("/uploadsTemp/temp_1_a.glb"), "/uploadsTemp/temp_1_a.glb");
    }
}
