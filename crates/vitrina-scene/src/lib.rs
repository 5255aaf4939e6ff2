//! Vitrina Scene - Bevy side of the admin panel
//!
//! Loads a glTF model, registers its meshes with the core model, turns the
//! pointer into picking rays and keeps Bevy materials in sync with the material
//! slots the orchestrator assigns.
//!
//! The host app inserts [`SceneConfig`], [`Presets`], [`Catalog`] and
//! [`tasks::TaskSpawner`] before adding [`VitrinaScenePlugin`]; missing ones fall
//! back to defaults (without a catalog, materials use default PBR settings).

pub mod apply;
pub mod camera;
pub mod geometry;
pub mod loader;
pub mod picking;
pub mod stage;
pub mod sync;
pub mod tasks;
pub mod types;

use bevy::prelude::*;

/// Plugin that sets up the viewer
pub struct VitrinaScenePlugin;

impl Plugin for VitrinaScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SceneConfig>()
            .init_resource::<Presets>()
            .init_resource::<ViewerModel>()
            .init_resource::<SceneNotifications>()
            .add_plugins(camera::CameraPlugin)
            .add_plugins(stage::StagePlugin)
            .add_plugins(loader::LoaderPlugin)
            .add_plugins(picking::PickingInputPlugin)
            .add_plugins(apply::ApplyPlugin)
            .add_plugins(sync::MaterialSyncPlugin)
            .configure_sets(
                Update,
                (ViewerSet::Load, ViewerSet::Input, ViewerSet::Apply).chain(),
            );
    }
}

pub use camera::{CameraSettings, MainCamera};
pub use tasks::TaskSpawner;
pub use types::*;
