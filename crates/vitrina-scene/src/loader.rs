//! glTF model loading and mesh registration

use bevy::asset::LoadState;
use bevy::ecs::system::SystemParam;
use bevy::mesh::VertexAttributeValues;
use bevy::prelude::*;
use bevy::scene::SceneInstance;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};
use vitrina_core::{Intent, MaterialSlot, Notification, Rgba};

use crate::camera::CameraSettings;
use crate::geometry::{extract_geometry, fit_transform, transform_matrix};
use crate::types::{
    LoadModel, MeshEntity, ModelRoot, ModelState, Presets, SceneConfig, SceneNotifications, ViewerModel,
    ViewerSet,
};

pub struct LoaderPlugin;

impl Plugin for LoaderPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<LoadModel>().add_systems(
            Update,
            (start_model_loads, spawn_loaded_scene, register_model_meshes)
                .chain()
                .in_set(ViewerSet::Load),
        );
    }
}

/// Replace the current model when a load is requested
fn start_model_loads(
    mut commands: Commands,
    mut requests: MessageReader<LoadModel>,
    asset_server: Res<AssetServer>,
    config: Res<SceneConfig>,
    mut viewer: ResMut<ViewerModel>,
    mut presets: ResMut<Presets>,
) {
    let Some(request) = requests.read().last().cloned() else {
        return;
    };

    if let Some(root) = viewer.root {
        commands.entity(root).despawn();
    }
    viewer.clear();
    presets.dispatch(Intent::ModelReplaced, &mut viewer.model);

    let url = config.asset_url(&request.path);
    info!(url = %url, "Loading model");
    let handle: Handle<Gltf> = asset_server.load(url);
    viewer.source = Some(request.path);
    viewer.state = ModelState::Loading(handle);
}

/// Spawn the default scene once the glTF asset is in
fn spawn_loaded_scene(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    mut viewer: ResMut<ViewerModel>,
    mut notifications: ResMut<SceneNotifications>,
) {
    let ModelState::Loading(handle) = &viewer.state else {
        return;
    };
    let handle = handle.clone();

    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            let scene = gltf_assets
                .get(&handle)
                .and_then(|gltf| gltf.default_scene.clone().or_else(|| gltf.scenes.first().cloned()));
            match scene {
                Some(scene) => {
                    let root = commands
                        .spawn((SceneRoot(scene), Transform::default(), Visibility::default(), ModelRoot))
                        .id();
                    viewer.root = Some(root);
                    viewer.state = ModelState::Spawning;
                }
                None => {
                    warn!(source = ?viewer.source, "Model has no scenes");
                    viewer.state = ModelState::Failed("model has no scenes".to_string());
                    notifications.0.push(Notification::error("The model contains no scene"));
                }
            }
        }
        Some(LoadState::Failed(e)) => {
            error!(source = ?viewer.source, error = %e, "Failed to load model");
            viewer.state = ModelState::Failed(e.to_string());
            notifications.0.push(Notification::error(format!("Failed to load model: {}", e)));
        }
        _ => {}
    }
}

#[derive(SystemParam)]
pub struct SceneHierarchy<'w, 's> {
    children: Query<'w, 's, &'static Children>,
    transforms: Query<'w, 's, &'static Transform, Without<ModelRoot>>,
    names: Query<'w, 's, &'static Name>,
    meshes: Query<'w, 's, (&'static Mesh3d, Option<&'static MeshMaterial3d<StandardMaterial>>)>,
}

/// A mesh entity found under the model root
struct FoundMesh {
    entity: Entity,
    name: String,
    /// Entity transform relative to the root
    matrix: Mat4,
    mesh: Handle<Mesh>,
    material: Option<Handle<StandardMaterial>>,
}

/// Walk the hierarchy below `entity`. Mesh entities take the name of the
/// closest named node above them; glTF puts node names on the parent of the
/// primitive entities.
fn collect_meshes<'a>(
    hierarchy: &'a SceneHierarchy,
    entity: Entity,
    parent: Mat4,
    node_name: Option<&'a str>,
    out: &mut Vec<FoundMesh>,
) {
    let Ok(children) = hierarchy.children.get(entity) else {
        return;
    };
    for child in children.iter() {
        let local = hierarchy
            .transforms
            .get(child)
            .map(transform_matrix)
            .unwrap_or(Mat4::IDENTITY);
        let matrix = parent * local;
        let own_name = hierarchy.names.get(child).ok().map(|n| n.as_str());

        if let Ok((mesh, material)) = hierarchy.meshes.get(child) {
            out.push(FoundMesh {
                entity: child,
                name: node_name.or(own_name).unwrap_or_default().to_string(),
                matrix,
                mesh: mesh.0.clone(),
                material: material.map(|m| m.0.clone()),
            });
            collect_meshes(hierarchy, child, matrix, node_name, out);
        } else {
            collect_meshes(hierarchy, child, matrix, own_name.or(node_name), out);
        }
    }
}

/// Register every mesh of a freshly spawned scene with the core model, then
/// centre and scale the model and frame it
#[allow(clippy::too_many_arguments)]
fn register_model_meshes(
    mut commands: Commands,
    mut viewer: ResMut<ViewerModel>,
    config: Res<SceneConfig>,
    scene_spawner: Res<SceneSpawner>,
    instances: Query<&SceneInstance, With<ModelRoot>>,
    mut root_transforms: Query<&mut Transform, With<ModelRoot>>,
    hierarchy: SceneHierarchy,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut camera: ResMut<CameraSettings>,
    mut notifications: ResMut<SceneNotifications>,
) {
    if !matches!(viewer.state, ModelState::Spawning) {
        return;
    }
    let Some(root) = viewer.root else {
        return;
    };
    let Ok(instance) = instances.get(root) else {
        return;
    };
    if !scene_spawner.instance_is_ready(**instance) {
        return;
    }

    let mut found = Vec::new();
    collect_meshes(&hierarchy, root, Mat4::IDENTITY, None, &mut found);

    let viewer = &mut *viewer;
    let mut imported_index: HashMap<AssetId<StandardMaterial>, usize> = HashMap::new();

    for item in found {
        let Some(source_mesh) = meshes.get(&item.mesh) else {
            continue;
        };
        let Some(geometry) = extract_geometry(source_mesh, &item.matrix) else {
            debug!(name = %item.name, "Skipping non-triangle mesh");
            continue;
        };
        let original_uvs = match source_mesh.attribute(Mesh::ATTRIBUTE_UV_0) {
            Some(VertexAttributeValues::Float32x2(uvs)) => Some(uvs.clone()),
            _ => None,
        };
        let own_mesh = source_mesh.clone();

        let slot = match item.material {
            Some(handle) if !config.clear_imported_materials => {
                let tint = materials
                    .get(&handle)
                    .map(|m| Rgba(m.base_color.to_srgba().to_f32_array()))
                    .unwrap_or(Rgba::WHITE);
                let index = *imported_index.entry(handle.id()).or_insert_with(|| {
                    viewer.imported.push(handle.clone());
                    viewer.imported.len() - 1
                });
                MaterialSlot::Imported { index, tint }
            }
            _ => MaterialSlot::Placeholder,
        };

        let id = viewer.model.push_mesh(&item.name, slot, geometry.triangles);
        let mesh = meshes.add(own_mesh);
        let material = materials.add(StandardMaterial::default());
        commands
            .entity(item.entity)
            .insert((Mesh3d(mesh.clone()), MeshMaterial3d(material.clone())));

        debug!(mesh = %id, entity = ?item.entity, "Registered mesh");
        viewer.entities.insert(
            id,
            MeshEntity {
                entity: item.entity,
                mesh,
                material,
                positions: geometry.positions,
                normals: geometry.normals,
                original_uvs,
            },
        );
    }

    let Some(bounds) = viewer.model.bounds() else {
        warn!(source = ?viewer.source, "Model has no triangle meshes");
        viewer.state = ModelState::Failed("no meshes".to_string());
        notifications.0.push(Notification::warning("The model contains no meshes"));
        return;
    };

    let fit = fit_transform(&bounds, config.max_model_dimension);
    let fit_matrix = transform_matrix(&fit);
    for entry in viewer.entities.values_mut() {
        for p in &mut entry.positions {
            *p = fit_matrix.transform_point3(Vec3::from_array(*p)).to_array();
        }
    }
    if let Ok(mut transform) = root_transforms.get_mut(root) {
        *transform = fit;
    }
    viewer.root_transform = fit;
    camera.fit(bounds.max_dimension() * fit.scale.x);
    viewer.state = ModelState::Ready;

    info!(
        meshes = viewer.model.len(),
        size = bounds.max_dimension(),
        scale = fit.scale.x,
        "Model ready"
    );
    notifications
        .0
        .push(Notification::success(format!("Model loaded ({} meshes)", viewer.model.len())));
}
