//! Resolution and assignment of materials to meshes
//!
//! Applying a SKU is split in two. [`MaterialApplier::begin`] validates the
//! target and hands back the texture paths the renderer has to fetch, tagged with
//! a ticket. Once the preview config and the textures have settled, the renderer
//! calls [`MaterialApplier::complete`] with what it found. Every `begin` bumps the
//! mesh's generation, so a completion that arrives after a newer request (or after
//! the model was replaced) is discarded instead of overwriting newer state.

use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

use crate::material::{MaterialChannel, MaterialConventions, PbrSettings, TexturePaths};
use crate::model::{LoadedModel, MaterialParams, MaterialSlot, MeshId, PbrMaterial};
use crate::tiling::TilingConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyError {
    #[error("Mesh not found in loaded model: {0}")]
    MeshNotFound(MeshId),
    #[error("Color map unavailable for {sku}: {path}")]
    ColorMapUnavailable { sku: String, path: String },
    #[error("Apply for mesh {mesh} superseded (generation {generation})")]
    Stale { mesh: MeshId, generation: u64 },
}

/// Per-call options. Whatever is left open here is taken from the preview config.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ApplyOptions {
    /// Fixed translucent material, no textures
    pub glass: bool,
    pub tiling: Option<f32>,
    pub offset: Option<f32>,
}

impl ApplyOptions {
    /// Fill the options the caller left open from a material's preview config
    pub fn with_settings(self, settings: &PbrSettings) -> Self {
        Self {
            glass: self.glass || settings.is_glass,
            // A zero tiling would collapse the texture to a single texel
            tiling: self.tiling.or(settings.tiling.filter(|t| *t > 0.0)),
            offset: self.offset.or(settings.offset),
        }
    }
}

/// Identifies one apply call for one mesh
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplyTicket {
    pub mesh: MeshId,
    pub generation: u64,
}

/// Work the renderer must do before an apply can complete
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyRequest {
    pub ticket: ApplyTicket,
    pub sku: String,
    pub paths: TexturePaths,
    pub options: ApplyOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyStart {
    /// Assigned synchronously (glass)
    Applied,
    /// Waiting on textures and the preview config
    Pending(ApplyRequest),
}

/// What the renderer found while fulfilling an [`ApplyRequest`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedTextures {
    /// Preview config from the catalog, `None` if the fetch failed
    pub settings: Option<PbrSettings>,
    pub color_loaded: bool,
    /// Optional channels whose texture loaded
    pub loaded: HashSet<MaterialChannel>,
}

/// Builds materials and assigns them to meshes of the current model
#[derive(Debug, Clone, Default)]
pub struct MaterialApplier {
    conventions: MaterialConventions,
    generations: HashMap<MeshId, u64>,
    next_generation: u64,
}

impl MaterialApplier {
    pub fn new(conventions: MaterialConventions) -> Self {
        Self {
            conventions,
            generations: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn conventions(&self) -> &MaterialConventions {
        &self.conventions
    }

    /// Start applying `sku` to `mesh`.
    ///
    /// Fails without touching the model if the mesh is not part of it.
    pub fn begin(
        &mut self,
        model: &mut LoadedModel,
        mesh: &MeshId,
        sku: &str,
        options: ApplyOptions,
    ) -> Result<ApplyStart, ApplyError> {
        let Some(node) = model.get_mut(mesh) else {
            return Err(ApplyError::MeshNotFound(mesh.clone()));
        };

        self.next_generation += 1;
        let generation = self.next_generation;
        self.generations.insert(mesh.clone(), generation);

        if options.glass {
            debug!(mesh = %mesh, "Applying glass");
            node.assign(MaterialSlot::Glass);
            // Nothing to wait for, but older pending applies must still lose
            self.generations.remove(mesh);
            return Ok(ApplyStart::Applied);
        }

        Ok(ApplyStart::Pending(ApplyRequest {
            ticket: ApplyTicket {
                mesh: mesh.clone(),
                generation,
            },
            sku: sku.to_string(),
            paths: self.conventions.resolve(sku),
            options,
        }))
    }

    /// Finish a pending apply with the renderer's findings
    pub fn complete(
        &mut self,
        model: &mut LoadedModel,
        request: &ApplyRequest,
        resolved: &ResolvedTextures,
    ) -> Result<(), ApplyError> {
        let ticket = &request.ticket;
        if self.generations.get(&ticket.mesh) != Some(&ticket.generation) {
            return Err(ApplyError::Stale {
                mesh: ticket.mesh.clone(),
                generation: ticket.generation,
            });
        }
        // A newer request is the only way to retry after this point
        self.generations.remove(&ticket.mesh);

        let settings = resolved.settings.clone().unwrap_or_default();
        let options = request.options.with_settings(&settings);

        if !options.glass && !resolved.color_loaded {
            return Err(ApplyError::ColorMapUnavailable {
                sku: request.sku.clone(),
                path: request.paths.color.clone(),
            });
        }

        let Some(node) = model.get_mut(&ticket.mesh) else {
            return Err(ApplyError::MeshNotFound(ticket.mesh.clone()));
        };

        if options.glass {
            debug!(mesh = %ticket.mesh, sku = %request.sku, "Preview config selects glass");
            node.assign(MaterialSlot::Glass);
            return Ok(());
        }

        let material = self.build_material(request, resolved, &settings, options);
        info!(
            mesh = %ticket.mesh,
            sku = %request.sku,
            maps = material.maps.len(),
            "Material applied"
        );
        node.assign(MaterialSlot::Textured(Box::new(material)));
        Ok(())
    }

    fn build_material(
        &self,
        request: &ApplyRequest,
        resolved: &ResolvedTextures,
        settings: &PbrSettings,
        options: ApplyOptions,
    ) -> PbrMaterial {
        let defaults = MaterialParams::default();

        let maps: BTreeMap<MaterialChannel, String> = request
            .paths
            .optional
            .iter()
            .filter(|(channel, _)| resolved.loaded.contains(*channel))
            .filter(|(channel, _)| settings.channel_enabled(**channel))
            .map(|(channel, path)| (*channel, path.clone()))
            .collect();

        PbrMaterial {
            sku: request.sku.clone(),
            texture_path: request.paths.color.clone(),
            maps,
            params: MaterialParams {
                metalness: settings.metalness.unwrap_or(defaults.metalness),
                roughness: settings.roughness.unwrap_or(defaults.roughness),
                normal_scale: settings.normal_scale.unwrap_or(defaults.normal_scale),
                ao_intensity: settings.ao_intensity.unwrap_or(defaults.ao_intensity),
                displacement_scale: settings.displacement_scale.unwrap_or(defaults.displacement_scale),
                displacement_bias: settings.displacement_bias.unwrap_or(defaults.displacement_bias),
            },
            tiling: TilingConfig::resolve(options.tiling, options.offset, &self.conventions),
        }
    }

    /// Restore a mesh's original material. Pending applies for it become stale.
    pub fn restore(&mut self, model: &mut LoadedModel, mesh: &MeshId) -> bool {
        self.generations.remove(mesh);
        model
            .get_mut(mesh)
            .map(|node| node.restore_original())
            .unwrap_or(false)
    }

    /// Make every pending apply stale
    pub fn invalidate_all(&mut self) {
        self.generations.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.generations.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::sample_model;

    fn loaded_all() -> ResolvedTextures {
        ResolvedTextures {
            settings: None,
            color_loaded: true,
            loaded: MaterialChannel::OPTIONAL.into_iter().collect(),
        }
    }

    fn pending(start: ApplyStart) -> ApplyRequest {
        match start {
            ApplyStart::Pending(request) => request,
            ApplyStart::Applied => panic!("expected a pending apply"),
        }
    }

    #[test]
    fn test_missing_mesh_aborts_without_mutation() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();

        let err = applier
            .begin(&mut model, &MeshId::from("nope"), "TILE_001", ApplyOptions::default())
            .unwrap_err();
        assert_eq!(err, ApplyError::MeshNotFound(MeshId::from("nope")));
        assert!(model.take_dirty().is_empty());
        assert_eq!(applier.pending_count(), 0);
    }

    #[test]
    fn test_apply_sets_texture_path() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();
        let mesh = MeshId::from("mesh_7");

        let request = pending(
            applier
                .begin(&mut model, &mesh, "TILE_001", ApplyOptions::default())
                .unwrap(),
        );
        applier.complete(&mut model, &request, &loaded_all()).unwrap();

        let node = model.get(&mesh).unwrap();
        assert_eq!(
            node.material.texture_path(),
            Some("/materials/TILE_001/TILE_001_Color.png")
        );
        assert!(node.is_dirty());
    }

    #[test]
    fn test_defaults_when_preview_config_missing() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();
        let mesh = MeshId::from("wall");

        let request = pending(applier.begin(&mut model, &mesh, "OAK", ApplyOptions::default()).unwrap());
        applier.complete(&mut model, &request, &loaded_all()).unwrap();

        let MaterialSlot::Textured(material) = &model.get(&mesh).unwrap().material else {
            panic!("expected textured material");
        };
        assert_eq!(material.params, MaterialParams::default());
        assert_eq!(material.tiling, TilingConfig::default());
        assert_eq!(material.maps.len(), 5);
    }

    #[test]
    fn test_missing_and_disabled_maps_are_absent() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();
        let mesh = MeshId::from("wall");

        let request = pending(applier.begin(&mut model, &mesh, "OAK", ApplyOptions::default()).unwrap());
        let resolved = ResolvedTextures {
            settings: Some(PbrSettings {
                metalness: Some(0.9),
                enable_normal: false,
                ..Default::default()
            }),
            color_loaded: true,
            loaded: [MaterialChannel::Normal, MaterialChannel::Roughness]
                .into_iter()
                .collect(),
        };
        applier.complete(&mut model, &request, &resolved).unwrap();

        let MaterialSlot::Textured(material) = &model.get(&mesh).unwrap().material else {
            panic!("expected textured material");
        };
        assert_eq!(material.maps.keys().copied().collect::<Vec<_>>(), vec![MaterialChannel::Roughness]);
        assert_eq!(material.params.metalness, 0.9);
        assert_eq!(material.params.roughness, 0.5);
    }

    #[test]
    fn test_missing_color_map_is_an_error() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();
        let mesh = MeshId::from("wall");

        let request = pending(applier.begin(&mut model, &mesh, "GHOST", ApplyOptions::default()).unwrap());
        let err = applier
            .complete(&mut model, &request, &ResolvedTextures::default())
            .unwrap_err();
        assert!(matches!(err, ApplyError::ColorMapUnavailable { .. }));
        assert_eq!(model.get(&mesh).unwrap().material, MaterialSlot::Placeholder);
    }

    #[test]
    fn test_late_completion_is_discarded() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();
        let mesh = MeshId::from("mesh_7");

        let first = pending(applier.begin(&mut model, &mesh, "OLD", ApplyOptions::default()).unwrap());
        let second = pending(applier.begin(&mut model, &mesh, "NEW", ApplyOptions::default()).unwrap());

        applier.complete(&mut model, &second, &loaded_all()).unwrap();
        let err = applier.complete(&mut model, &first, &loaded_all()).unwrap_err();
        assert!(matches!(err, ApplyError::Stale { .. }));
        assert_eq!(
            model.get(&mesh).unwrap().material.texture_path(),
            Some("/materials/NEW/NEW_Color.png")
        );
    }

    #[test]
    fn test_invalidate_all_discards_pending() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();
        let request = pending(
            applier
                .begin(&mut model, &MeshId::from("floor"), "OAK", ApplyOptions::default())
                .unwrap(),
        );

        applier.invalidate_all();
        assert!(applier.complete(&mut model, &request, &loaded_all()).is_err());
        assert!(model.get(&MeshId::from("floor")).unwrap().material.is_default());
    }

    #[test]
    fn test_original_captured_before_first_apply() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();
        let mesh = MeshId::from("mesh_7");

        for sku in ["A", "B"] {
            let request = pending(applier.begin(&mut model, &mesh, sku, ApplyOptions::default()).unwrap());
            applier.complete(&mut model, &request, &loaded_all()).unwrap();
        }
        assert_eq!(
            model.get(&mesh).unwrap().original_material,
            Some(MaterialSlot::Placeholder)
        );

        assert!(applier.restore(&mut model, &mesh));
        assert_eq!(model.get(&mesh).unwrap().material, MaterialSlot::Placeholder);
    }

    #[test]
    fn test_glass_is_immediate() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();
        let mesh = MeshId::from("wall");

        let start = applier
            .begin(
                &mut model,
                &mesh,
                "GLASS",
                ApplyOptions {
                    glass: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(start, ApplyStart::Applied);
        let node = model.get(&mesh).unwrap();
        assert_eq!(node.material, MaterialSlot::Glass);
        assert!(!node.casts_shadows);
    }

    #[test]
    fn test_tiling_override() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();
        let mesh = MeshId::from("wall");
        let options = ApplyOptions {
            tiling: Some(2.0),
            ..Default::default()
        };

        let request = pending(applier.begin(&mut model, &mesh, "OAK", options).unwrap());
        applier.complete(&mut model, &request, &loaded_all()).unwrap();
        let MaterialSlot::Textured(material) = &model.get(&mesh).unwrap().material else {
            panic!("expected textured material");
        };
        assert_eq!(material.tiling.tiling, 2.0);
        assert!((material.tiling.offset - 2.0 * 0.726).abs() < 1e-6);
    }

    #[test]
    fn test_preview_config_tiling_and_offset() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();
        let mesh = MeshId::from("wall");

        let request = pending(applier.begin(&mut model, &mesh, "OAK", ApplyOptions::default()).unwrap());
        let resolved = ResolvedTextures {
            settings: Some(PbrSettings {
                tiling: Some(2.0),
                offset: Some(0.1),
                displacement_scale: Some(0.0),
                ..Default::default()
            }),
            ..loaded_all()
        };
        applier.complete(&mut model, &request, &resolved).unwrap();

        let MaterialSlot::Textured(material) = &model.get(&mesh).unwrap().material else {
            panic!("expected textured material");
        };
        assert_eq!(material.tiling, TilingConfig { tiling: 2.0, offset: 0.1 });
        assert_eq!(material.params.displacement_scale, 0.0);
        assert_eq!(material.params.displacement_bias, -0.05);
    }

    #[test]
    fn test_call_options_win_over_preview_config() {
        let settings = PbrSettings {
            tiling: Some(2.0),
            offset: Some(0.1),
            ..Default::default()
        };
        let options = ApplyOptions {
            tiling: Some(0.5),
            ..Default::default()
        }
        .with_settings(&settings);
        assert_eq!(options.tiling, Some(0.5));
        assert_eq!(options.offset, Some(0.1));

        let zero = PbrSettings {
            tiling: Some(0.0),
            ..Default::default()
        };
        assert_eq!(ApplyOptions::default().with_settings(&zero).tiling, None);
    }

    #[test]
    fn test_preview_config_selects_glass() {
        let mut model = sample_model();
        let mut applier = MaterialApplier::default();
        let mesh = MeshId::from("wall");

        let request = pending(applier.begin(&mut model, &mesh, "CRISTAL", ApplyOptions::default()).unwrap());
        let resolved = ResolvedTextures {
            settings: Some(PbrSettings {
                is_glass: true,
                tiling: Some(2.0),
                ..Default::default()
            }),
            // Glass needs no color map
            color_loaded: false,
            loaded: HashSet::new(),
        };
        applier.complete(&mut model, &request, &resolved).unwrap();

        let node = model.get(&mesh).unwrap();
        assert_eq!(node.material, MaterialSlot::Glass);
        assert!(!node.casts_shadows);
        assert_eq!(node.original_material, Some(MaterialSlot::Placeholder));
    }
}
