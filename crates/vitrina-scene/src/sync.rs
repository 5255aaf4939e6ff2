//! Mirrors mesh material slots into Bevy materials
//!
//! The core model marks meshes dirty when their slot or displayed color
//! changes. This system rebuilds the entity's `StandardMaterial` from the slot,
//! regenerates texture coordinates for textured slots and keeps shadow casting
//! in line with the slot.

use bevy::asset::RenderAssetUsages;
use bevy::image::ImageSampler;
use bevy::light::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use std::collections::HashMap;
use tracing::warn;
use vitrina_core::tiling::box_project;
use vitrina_core::{MaterialChannel, MaterialSlot, MeshNode, PbrMaterial, Rgba, TilingConfig};

use crate::apply::{repeat_sampler, TextureCache};
use crate::types::{MeshEntity, ViewerModel};

pub struct MaterialSyncPlugin;

impl Plugin for MaterialSyncPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, sync_materials);
    }
}

pub fn to_color(rgba: Rgba) -> Color {
    let [r, g, b, a] = rgba.0;
    Color::srgba(r, g, b, a)
}

/// Neutral material shown before anything is bound
pub fn placeholder_material() -> StandardMaterial {
    StandardMaterial {
        base_color: to_color(Rgba::PLACEHOLDER),
        metallic: 0.0,
        perceptual_roughness: 0.5,
        ..default()
    }
}

pub fn glass_material() -> StandardMaterial {
    StandardMaterial {
        base_color: to_color(Rgba::GLASS),
        alpha_mode: AlphaMode::Blend,
        metallic: 0.0,
        perceptual_roughness: 0.0,
        specular_transmission: 1.0,
        thickness: 0.5,
        ior: 10.0,
        ..default()
    }
}

/// 8-bit RGBA pixels
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaPixels {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RgbaPixels {
    fn red_at(&self, x: u32, y: u32, width: u32, height: u32) -> u8 {
        // Nearest sample when the two maps differ in size
        let sx = (x as u64 * self.width as u64 / width.max(1) as u64) as u32;
        let sy = (y as u64 * self.height as u64 / height.max(1) as u64) as u32;
        let index = ((sy.min(self.height - 1) * self.width + sx.min(self.width - 1)) * 4) as usize;
        self.data.get(index).copied().unwrap_or(255)
    }

    pub fn into_image(self) -> Image {
        let mut image = Image::new(
            Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            self.data,
            TextureFormat::Rgba8Unorm,
            RenderAssetUsages::default(),
        );
        image.sampler = ImageSampler::Descriptor(repeat_sampler());
        image
    }
}

/// Pixels of a loaded 8-bit RGBA image
pub fn rgba_pixels(image: &Image) -> Option<RgbaPixels> {
    if !matches!(
        image.texture_descriptor.format,
        TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb
    ) {
        return None;
    }
    let (width, height) = (image.width(), image.height());
    let data = image.data.as_ref()?;
    if width == 0 || height == 0 || data.len() != (width * height * 4) as usize {
        return None;
    }
    Some(RgbaPixels {
        width,
        height,
        data: data.clone(),
    })
}

/// Pack grayscale roughness and metalness maps into one image with roughness
/// in green and metalness in blue. A missing map reads as full intensity.
pub fn pack_metallic_roughness(roughness: Option<&RgbaPixels>, metalness: Option<&RgbaPixels>) -> Option<RgbaPixels> {
    let reference = roughness.or(metalness)?;
    let (width, height) = (reference.width, reference.height);
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let g = roughness.map(|m| m.red_at(x, y, width, height)).unwrap_or(255);
            let b = metalness.map(|m| m.red_at(x, y, width, height)).unwrap_or(255);
            data.extend_from_slice(&[0, g, b, 255]);
        }
    }
    Some(RgbaPixels { width, height, data })
}

fn packed_texture(
    cache: &mut TextureCache,
    images: &mut Assets<Image>,
    roughness: Option<&String>,
    metalness: Option<&String>,
) -> Option<Handle<Image>> {
    let key = (roughness.cloned(), metalness.cloned());
    if let Some(handle) = cache.packed.get(&key) {
        return Some(handle.clone());
    }
    let pixels = |path: Option<&String>| {
        path.and_then(|p| cache.get(p))
            .and_then(|h| images.get(&h))
            .and_then(rgba_pixels)
    };
    let rough = pixels(roughness);
    let metal = pixels(metalness);
    let packed = pack_metallic_roughness(rough.as_ref(), metal.as_ref())?;
    let handle = images.add(packed.into_image());
    cache.packed.insert(key, handle.clone());
    Some(handle)
}

pub fn textured_material(pbr: &PbrMaterial, cache: &mut TextureCache, images: &mut Assets<Image>) -> StandardMaterial {
    let params = pbr.params;
    let mut material = StandardMaterial {
        base_color_texture: cache.get(&pbr.texture_path),
        metallic: params.metalness,
        perceptual_roughness: params.roughness,
        ..default()
    };

    if let Some(path) = pbr.maps.get(&MaterialChannel::Normal) {
        material.normal_map_texture = cache.get(path);
        // Library normal maps are authored Y-down
        material.flip_normal_map_y = params.normal_scale > 0.0;
    }

    let roughness = pbr.maps.get(&MaterialChannel::Roughness);
    let metalness = pbr.maps.get(&MaterialChannel::Metalness);
    if roughness.is_some() || metalness.is_some() {
        material.metallic_roughness_texture = packed_texture(cache, images, roughness, metalness);
    }

    if let Some(path) = pbr.maps.get(&MaterialChannel::AmbientOcclusion) {
        material.occlusion_texture = cache.get(path);
    }

    if let Some(path) = pbr.maps.get(&MaterialChannel::Displacement) {
        material.depth_map = cache.get(path);
        material.parallax_depth_scale = params.displacement_scale.abs();
    }

    material
}

/// Bevy material for a mesh's current slot and displayed color
pub fn build_material(
    node: &MeshNode,
    imported: &[Handle<StandardMaterial>],
    materials: &Assets<StandardMaterial>,
    cache: &mut TextureCache,
    images: &mut Assets<Image>,
) -> StandardMaterial {
    let mut material = match &node.material {
        MaterialSlot::Imported { index, .. } => imported
            .get(*index)
            .and_then(|handle| materials.get(handle))
            .cloned()
            .unwrap_or_default(),
        MaterialSlot::Placeholder => placeholder_material(),
        MaterialSlot::Glass => glass_material(),
        MaterialSlot::Textured(pbr) => textured_material(pbr, cache, images),
    };
    material.base_color = to_color(node.appearance);
    material
}

/// Projection a slot wants on its mesh, `None` for the file's own UVs
fn projection_for(node: &MeshNode) -> Option<TilingConfig> {
    match &node.material {
        MaterialSlot::Textured(pbr) => Some(pbr.tiling),
        _ => None,
    }
}

fn update_uvs(mesh: &mut Mesh, entry: &MeshEntity, projection: Option<TilingConfig>) {
    match (projection, &entry.original_uvs) {
        (Some(config), _) => {
            let uvs = box_project(&entry.positions, &entry.normals, &config);
            mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        }
        (None, Some(original)) => {
            mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, original.clone());
        }
        (None, None) => {
            mesh.remove_attribute(Mesh::ATTRIBUTE_UV_0);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn sync_materials(
    mut commands: Commands,
    mut viewer: ResMut<ViewerModel>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut images: ResMut<Assets<Image>>,
    mut cache: ResMut<TextureCache>,
    mut applied_projection: Local<HashMap<Entity, Option<TilingConfig>>>,
) {
    let dirty = viewer.model.take_dirty();
    if dirty.is_empty() {
        return;
    }

    let viewer = &*viewer;
    for id in dirty {
        let (Some(node), Some(entry)) = (viewer.model.get(&id), viewer.entities.get(&id)) else {
            continue;
        };

        let material = build_material(node, &viewer.imported, &materials, &mut cache, &mut images);
        let needs_tangents = material.normal_map_texture.is_some() || material.depth_map.is_some();
        if let Some(target) = materials.get_mut(&entry.material) {
            *target = material;
        }

        let projection = projection_for(node);
        let uvs_changed = applied_projection.get(&entry.entity) != Some(&projection);
        if let Some(mesh) = meshes.get_mut(&entry.mesh) {
            if uvs_changed {
                update_uvs(mesh, entry, projection);
                applied_projection.insert(entry.entity, projection);
            }
            if needs_tangents && (uvs_changed || mesh.attribute(Mesh::ATTRIBUTE_TANGENT).is_none()) {
                if let Err(e) = mesh.generate_tangents() {
                    warn!(mesh = %id, error = %e, "Cannot generate tangents, normal map ignored");
                }
            }
        }

        if node.casts_shadows {
            commands.entity(entry.entity).remove::<NotShadowCaster>();
        } else {
            commands.entity(entry.entity).insert(NotShadowCaster);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use vitrina_core::{LoadedModel, MaterialParams};

    fn gray(width: u32, height: u32, value: u8) -> RgbaPixels {
        RgbaPixels {
            width,
            height,
            data: [value, value, value, 255].repeat((width * height) as usize),
        }
    }

    #[test]
    fn test_pack_both_maps() {
        let packed = pack_metallic_roughness(Some(&gray(2, 2, 100)), Some(&gray(2, 2, 30))).unwrap();
        assert_eq!((packed.width, packed.height), (2, 2));
        assert_eq!(&packed.data[..4], &[0, 100, 30, 255]);
        assert_eq!(packed.data.len(), 16);
    }

    #[test]
    fn test_pack_single_map() {
        let packed = pack_metallic_roughness(None, Some(&gray(1, 1, 40))).unwrap();
        assert_eq!(packed.data, vec![0, 255, 40, 255]);
        assert!(pack_metallic_roughness(None, None).is_none());
    }

    #[test]
    fn test_pack_mismatched_sizes() {
        let packed = pack_metallic_roughness(Some(&gray(4, 4, 10)), Some(&gray(1, 1, 200))).unwrap();
        assert_eq!((packed.width, packed.height), (4, 4));
        assert!(packed.data.chunks(4).all(|px| px == [0, 10, 200, 255]));
    }

    #[test]
    fn test_rgba_pixels_round_trip() {
        let image = gray(3, 2, 77).into_image();
        let pixels = rgba_pixels(&image).unwrap();
        assert_eq!((pixels.width, pixels.height), (3, 2));
        assert_eq!(pixels.data[0], 77);
    }

    #[test]
    fn test_glass_material() {
        let glass = glass_material();
        assert_eq!(glass.alpha_mode, AlphaMode::Blend);
        assert_eq!(glass.specular_transmission, 1.0);
        assert_eq!(glass.thickness, 0.5);
        assert!((glass.base_color.alpha() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_build_material_uses_appearance() {
        let mut model = LoadedModel::new();
        let id = model.push_mesh("wall", MaterialSlot::Placeholder, Vec::new());
        let node = model.get(&id).unwrap();

        let materials = Assets::<StandardMaterial>::default();
        let mut images = Assets::<Image>::default();
        let mut cache = TextureCache::default();
        let material = build_material(node, &[], &materials, &mut cache, &mut images);
        assert_eq!(material.base_color, to_color(Rgba::PLACEHOLDER));
    }

    #[test]
    fn test_textured_material_maps() {
        let mut images = Assets::<Image>::default();
        let mut cache = TextureCache::default();
        let color = images.add(gray(1, 1, 128).into_image());
        let rough = images.add(gray(1, 1, 90).into_image());
        cache.textures.insert("/c.png".into(), color.clone());
        cache.textures.insert("/r.jpg".into(), rough);

        let mut maps = BTreeMap::new();
        maps.insert(MaterialChannel::Roughness, "/r.jpg".to_string());
        let pbr = PbrMaterial {
            sku: "TILE_001".into(),
            texture_path: "/c.png".into(),
            maps,
            params: MaterialParams::default(),
            tiling: TilingConfig::default(),
        };

        let material = textured_material(&pbr, &mut cache, &mut images);
        assert_eq!(material.base_color_texture, Some(color));
        assert!(material.metallic_roughness_texture.is_some());
        assert!(material.normal_map_texture.is_none());
        assert_eq!(material.metallic, 0.3);
        assert_eq!(cache.packed.len(), 1);
    }
}
