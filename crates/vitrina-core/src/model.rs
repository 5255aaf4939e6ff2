//! Flat view of a loaded 3D model
//!
//! The renderer owns the scene graph. This module keeps what the binding workflow
//! needs from it: one node per mesh with a stable identifier, its material slot,
//! and its triangles in model space for picking.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::material::MaterialChannel;
use crate::raycast::{raycast_triangles, Aabb, Ray};
use crate::tiling::TilingConfig;

/// Stable identifier of a mesh within a loaded model.
///
/// Derived from the mesh name at load time. Unnamed meshes get `mesh_{index}`
/// and repeated names get a `#n` suffix in traversal order, so the same file
/// always yields the same identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeshId(pub String);

impl MeshId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MeshId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Linear RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([1.0, 1.0, 1.0, 1.0]);
    /// Hover highlight while selecting a target mesh
    pub const HIGHLIGHT: Rgba = Rgba([0.0, 1.0, 0.0, 1.0]);
    /// Neutral material shown on meshes without a binding
    pub const PLACEHOLDER: Rgba = Rgba([0.0, 1.0, 1.0, 1.0]);
    pub const GLASS: Rgba = Rgba([1.0, 1.0, 1.0, 0.4]);

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Rgba([r, g, b, 1.0])
    }
}

/// Scalar parameters of a textured material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialParams {
    pub metalness: f32,
    pub roughness: f32,
    pub normal_scale: f32,
    pub ao_intensity: f32,
    pub displacement_scale: f32,
    pub displacement_bias: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            metalness: 0.3,
            roughness: 0.5,
            normal_scale: 2.0,
            ao_intensity: 1.0,
            displacement_scale: -0.05,
            displacement_bias: -0.05,
        }
    }
}

/// A render-ready textured material, independent of any renderer
#[derive(Debug, Clone, PartialEq)]
pub struct PbrMaterial {
    pub sku: String,
    /// Color map path. Identifies which SKU the material came from.
    pub texture_path: String,
    /// Optional maps that were found and are enabled
    pub maps: BTreeMap<MaterialChannel, String>,
    pub params: MaterialParams,
    pub tiling: TilingConfig,
}

/// What currently occupies a mesh's material slot
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSlot {
    /// Material that came with the file, by index in the renderer's table
    Imported { index: usize, tint: Rgba },
    /// Neutral material used before anything is bound
    Placeholder,
    Textured(Box<PbrMaterial>),
    Glass,
}

impl MaterialSlot {
    /// Base color the slot displays when not highlighted
    pub fn base_tint(&self) -> Rgba {
        match self {
            MaterialSlot::Imported { tint, .. } => *tint,
            MaterialSlot::Placeholder => Rgba::PLACEHOLDER,
            MaterialSlot::Textured(_) => Rgba::WHITE,
            MaterialSlot::Glass => Rgba::GLASS,
        }
    }

    pub fn texture_path(&self) -> Option<&str> {
        match self {
            MaterialSlot::Textured(material) => Some(&material.texture_path),
            _ => None,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, MaterialSlot::Placeholder | MaterialSlot::Imported { .. })
    }
}

/// One mesh of the loaded model
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub id: MeshId,
    /// Name as found in the file (may be empty)
    pub name: String,
    pub material: MaterialSlot,
    /// Material present before the first assignment, kept for restoration
    pub original_material: Option<MaterialSlot>,
    /// Base color currently displayed
    pub appearance: Rgba,
    cached_appearance: Option<Rgba>,
    highlighted: bool,
    pub casts_shadows: bool,
    triangles: Vec<[Vec3; 3]>,
    bounds: Option<Aabb>,
    dirty: bool,
}

impl MeshNode {
    fn new(id: MeshId, name: String, material: MaterialSlot, triangles: Vec<[Vec3; 3]>) -> Self {
        let bounds = Aabb::from_points(triangles.iter().flatten().copied());
        Self {
            id,
            name,
            appearance: material.base_tint(),
            material,
            original_material: None,
            cached_appearance: None,
            highlighted: false,
            casts_shadows: true,
            triangles,
            bounds,
            dirty: true,
        }
    }

    pub fn triangles(&self) -> &[[Vec3; 3]] {
        &self.triangles
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Replace the material slot.
    ///
    /// A highlighted mesh stays highlighted; the new material shows once the
    /// pointer leaves it.
    pub fn set_material(&mut self, material: MaterialSlot) {
        self.casts_shadows = material != MaterialSlot::Glass;
        let tint = material.base_tint();
        if self.highlighted {
            self.cached_appearance = Some(tint);
        } else {
            self.appearance = tint;
            self.cached_appearance = None;
        }
        self.material = material;
        self.dirty = true;
    }

    /// Assign a material, capturing the previous one as original the first time only
    pub fn assign(&mut self, material: MaterialSlot) {
        if self.original_material.is_none() {
            self.original_material = Some(self.material.clone());
        }
        self.set_material(material);
    }

    /// Put back the captured original material, if any
    pub fn restore_original(&mut self) -> bool {
        match self.original_material.take() {
            Some(original) => {
                self.set_material(original);
                true
            }
            None => false,
        }
    }

    pub(crate) fn highlight(&mut self) {
        if self.cached_appearance.is_none() {
            self.cached_appearance = Some(self.appearance);
        }
        self.appearance = Rgba::HIGHLIGHT;
        self.highlighted = true;
        self.dirty = true;
    }

    pub(crate) fn unhighlight(&mut self) {
        self.highlighted = false;
        if let Some(cached) = self.cached_appearance {
            self.appearance = cached;
            self.dirty = true;
        }
    }

    fn intersect(&self, ray: &Ray) -> Option<f32> {
        self.bounds?.intersect(ray)?;
        raycast_triangles(ray, &self.triangles).map(|hit| hit.t)
    }
}

/// Nearest mesh under a ray
#[derive(Debug, Clone, PartialEq)]
pub struct MeshHit {
    pub mesh: MeshId,
    pub distance: f32,
}

/// Flat list of the meshes of the model currently shown
#[derive(Debug, Clone, Default)]
pub struct LoadedModel {
    meshes: Vec<MeshNode>,
    index: HashMap<MeshId, usize>,
    names: HashMap<String, usize>,
}

impl LoadedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mesh in traversal order and return its assigned identifier
    pub fn push_mesh(&mut self, name: &str, material: MaterialSlot, triangles: Vec<[Vec3; 3]>) -> MeshId {
        let id = self.next_id(name);
        self.index.insert(id.clone(), self.meshes.len());
        self.meshes
            .push(MeshNode::new(id.clone(), name.to_string(), material, triangles));
        id
    }

    fn next_id(&mut self, name: &str) -> MeshId {
        let trimmed = name.trim();
        let base = if trimmed.is_empty() {
            format!("mesh_{}", self.meshes.len())
        } else {
            trimmed.to_string()
        };
        let seen = self.names.entry(base.clone()).or_insert(0);
        *seen += 1;
        let mut candidate = if *seen == 1 {
            base.clone()
        } else {
            format!("{}#{}", base, seen)
        };
        // A literal "name#2" in the file must not collide with a generated suffix
        while self.index.contains_key(&MeshId(candidate.clone())) {
            *seen += 1;
            candidate = format!("{}#{}", base, seen);
        }
        MeshId(candidate)
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn meshes(&self) -> impl Iterator<Item = &MeshNode> {
        self.meshes.iter()
    }

    pub fn contains(&self, id: &MeshId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &MeshId) -> Option<&MeshNode> {
        self.index.get(id).map(|&i| &self.meshes[i])
    }

    pub fn get_mut(&mut self, id: &MeshId) -> Option<&mut MeshNode> {
        self.index.get(id).map(|&i| &mut self.meshes[i])
    }

    /// Bounds of every mesh, in model space
    pub fn bounds(&self) -> Option<Aabb> {
        self.meshes
            .iter()
            .filter_map(|mesh| mesh.bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Nearest mesh hit by the ray. An empty model never hits.
    pub fn intersect(&self, ray: &Ray) -> Option<MeshHit> {
        let mut closest: Option<MeshHit> = None;
        for mesh in &self.meshes {
            if let Some(distance) = mesh.intersect(ray) {
                if closest.as_ref().map_or(true, |c| distance < c.distance) {
                    closest = Some(MeshHit {
                        mesh: mesh.id.clone(),
                        distance,
                    });
                }
            }
        }
        closest
    }

    /// Replace every mesh material with the neutral placeholder.
    ///
    /// Captured originals are dropped: the placeholder is what the next
    /// assignment captures.
    pub fn reset_to_placeholder(&mut self) {
        for mesh in &mut self.meshes {
            mesh.original_material = None;
            mesh.set_material(MaterialSlot::Placeholder);
        }
    }

    /// Identifiers of meshes whose display changed since the last call
    pub fn take_dirty(&mut self) -> Vec<MeshId> {
        self.meshes
            .iter_mut()
            .filter(|mesh| mesh.dirty)
            .map(|mesh| {
                mesh.dirty = false;
                mesh.id.clone()
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Axis-aligned unit quad facing +Z, translated by `offset`
    pub(crate) fn quad(offset: Vec3) -> Vec<[Vec3; 3]> {
        let a = Vec3::new(0.0, 0.0, 0.0) + offset;
        let b = Vec3::new(1.0, 0.0, 0.0) + offset;
        let c = Vec3::new(1.0, 1.0, 0.0) + offset;
        let d = Vec3::new(0.0, 1.0, 0.0) + offset;
        vec![[a, b, c], [a, c, d]]
    }

    pub(crate) fn sample_model() -> LoadedModel {
        let mut model = LoadedModel::new();
        model.push_mesh("mesh_7", MaterialSlot::Placeholder, quad(Vec3::ZERO));
        model.push_mesh("wall", MaterialSlot::Placeholder, quad(Vec3::new(3.0, 0.0, 0.0)));
        model.push_mesh("floor", MaterialSlot::Placeholder, quad(Vec3::new(0.0, 0.0, -2.0)));
        model.take_dirty();
        model
    }

    #[test]
    fn test_mesh_ids_are_stable_and_unique() {
        let mut model = LoadedModel::new();
        let a = model.push_mesh("Chair", MaterialSlot::Placeholder, vec![]);
        let b = model.push_mesh("", MaterialSlot::Placeholder, vec![]);
        let c = model.push_mesh("Chair", MaterialSlot::Placeholder, vec![]);
        let d = model.push_mesh("  Chair ", MaterialSlot::Placeholder, vec![]);

        assert_eq!(a.as_str(), "Chair");
        assert_eq!(b.as_str(), "mesh_1");
        assert_eq!(c.as_str(), "Chair#2");
        assert_eq!(d.as_str(), "Chair#3");
        assert_eq!(model.len(), 4);
    }

    #[test]
    fn test_literal_suffix_does_not_collide() {
        let mut model = LoadedModel::new();
        model.push_mesh("Chair#2", MaterialSlot::Placeholder, vec![]);
        model.push_mesh("Chair", MaterialSlot::Placeholder, vec![]);
        let dup = model.push_mesh("Chair", MaterialSlot::Placeholder, vec![]);
        assert_eq!(dup.as_str(), "Chair#3");

        let mut model = LoadedModel::new();
        model.push_mesh("mesh_1", MaterialSlot::Placeholder, vec![]);
        let unnamed = model.push_mesh("", MaterialSlot::Placeholder, vec![]);
        assert_eq!(unnamed.as_str(), "mesh_1#2");
    }

    #[test]
    fn test_intersect_returns_nearest_mesh() {
        let model = sample_model();
        let ray = Ray::new(Vec3::new(0.5, 0.5, 5.0), Vec3::NEG_Z);

        let hit = model.intersect(&ray).unwrap();
        assert_eq!(hit.mesh.as_str(), "mesh_7");
        assert!((hit.distance - 5.0).abs() < 1e-5);

        let miss = Ray::new(Vec3::new(-5.0, -5.0, 5.0), Vec3::NEG_Z);
        assert!(model.intersect(&miss).is_none());
    }

    #[test]
    fn test_empty_model_never_hits() {
        let model = LoadedModel::new();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(model.intersect(&ray).is_none());
        assert!(model.bounds().is_none());
    }

    #[test]
    fn test_assign_captures_original_once() {
        let mut model = LoadedModel::new();
        let id = model.push_mesh(
            "seat",
            MaterialSlot::Imported { index: 3, tint: Rgba::WHITE },
            quad(Vec3::ZERO),
        );
        let node = model.get_mut(&id).unwrap();

        node.assign(MaterialSlot::Glass);
        node.assign(MaterialSlot::Placeholder);

        assert_eq!(
            node.original_material,
            Some(MaterialSlot::Imported { index: 3, tint: Rgba::WHITE })
        );
        assert!(node.restore_original());
        assert!(matches!(node.material, MaterialSlot::Imported { index: 3, .. }));
        assert!(!node.restore_original());
    }

    #[test]
    fn test_glass_disables_shadows() {
        let mut model = sample_model();
        let id = MeshId::from("wall");
        model.get_mut(&id).unwrap().assign(MaterialSlot::Glass);
        assert!(!model.get(&id).unwrap().casts_shadows);

        model.reset_to_placeholder();
        assert!(model.get(&id).unwrap().casts_shadows);
    }

    #[test]
    fn test_reset_forgets_imported_original() {
        let mut model = LoadedModel::new();
        let id = model.push_mesh(
            "sofa",
            MaterialSlot::Imported { index: 0, tint: Rgba::WHITE },
            quad(Vec3::ZERO),
        );
        model.get_mut(&id).unwrap().assign(MaterialSlot::Glass);

        model.reset_to_placeholder();
        let node = model.get_mut(&id).unwrap();
        assert_eq!(node.original_material, None);

        node.assign(MaterialSlot::Glass);
        assert!(node.restore_original());
        assert_eq!(node.material, MaterialSlot::Placeholder);
    }

    #[test]
    fn test_material_change_keeps_highlight() {
        let mut model = sample_model();
        let id = MeshId::from("wall");
        let node = model.get_mut(&id).unwrap();
        node.highlight();

        node.assign(MaterialSlot::Glass);
        assert!(node.is_highlighted());
        assert_eq!(node.appearance, Rgba::HIGHLIGHT);

        node.unhighlight();
        assert_eq!(node.appearance, Rgba::GLASS);
    }

    #[test]
    fn test_take_dirty_drains() {
        let mut model = sample_model();
        assert!(model.take_dirty().is_empty());

        model.get_mut(&MeshId::from("floor")).unwrap().assign(MaterialSlot::Glass);
        assert_eq!(model.take_dirty(), vec![MeshId::from("floor")]);
        assert!(model.take_dirty().is_empty());
    }

    #[test]
    fn test_bounds_cover_all_meshes() {
        let model = sample_model();
        let bounds = model.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(bounds.max, Vec3::new(4.0, 1.0, 0.0));
    }
}
