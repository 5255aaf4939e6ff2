//! Bevy application setup

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::DefaultPickingPlugins;
use tracing::{error, info};
use vitrina_catalog::CatalogClient;
use vitrina_core::{BindingStore, MaterialApplier, MeshPicker, PresetOrchestrator};
use vitrina_scene::{Catalog, Presets, TaskSpawner, VitrinaScenePlugin};

use crate::config::Config;
use crate::file_picker::{PendingFileResults, PickResult};
use crate::toasts::{Durations, ToastPlugin};
use crate::ui::{PanelSettings, UiPlugin};
use crate::upload::UploadPlugin;

/// Resources derived from the configuration, inserted before any plugin
fn insert_config(app: &mut App, config: &Config) {
    let orchestrator = PresetOrchestrator::new(
        BindingStore::new(),
        MeshPicker::new(),
        MaterialApplier::new(config.materials.clone()),
    );

    app.insert_resource(config.scene_config())
        .insert_resource(Presets(orchestrator))
        .insert_resource(PanelSettings {
            link_base: config.viewer.link_base.clone(),
        })
        .insert_resource(Durations(config.notifications.clone()));

    // Without these the panels stay usable but every catalog call reports an error
    match CatalogClient::new(&config.api.base_url, config.api.timeout_secs) {
        Ok(client) => {
            app.insert_resource(Catalog(client));
        }
        Err(e) => error!(url = %config.api.base_url, error = %e, "Failed to create catalog client"),
    }
    match TaskSpawner::new() {
        Ok(spawner) => {
            app.insert_resource(spawner);
        }
        Err(e) => error!(error = %e, "Failed to start background runtime"),
    }
}

/// Run the admin panel. `startup_files` are uploaded as soon as the app starts.
pub fn run(config: Config, startup_files: Vec<PickResult>) {
    info!(api = %config.api.base_url, "Starting admin panel");

    let pending = PendingFileResults::default();
    for file in startup_files {
        pending.push(file);
    }

    let mut app = App::new();
    insert_config(&mut app, &config);
    app.insert_resource(pending)
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Vitrina Admin".to_string(),
                    canvas: Some("#vitrina-canvas".to_string()),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // Models and textures are absolute URLs on the backend
                file_path: "".to_string(),
                // Don't look for .meta files - server doesn't have them
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // Must be added BEFORE EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(EguiPlugin::default())
        .add_plugins(VitrinaScenePlugin)
        .add_plugins(UploadPlugin)
        .add_plugins(UiPlugin)
        .add_plugins(ToastPlugin)
        .run();
}
