//! Coordination of picking, bindings and material application
//!
//! The orchestrator owns the binding store, the picker and the applier. UI and
//! renderer talk to it through [`Intent`]s; it answers with the apply requests the
//! renderer has to fulfil and queues notifications for the user.

use std::collections::VecDeque;
use tracing::{debug, info, warn};

use crate::applier::{ApplyError, ApplyOptions, ApplyRequest, ApplyStart, MaterialApplier, ResolvedTextures};
use crate::binding::{Binding, BindingChange, BindingStore, DeleteOutcome, Preset};
use crate::model::{LoadedModel, MeshId};
use crate::notification::Notification;
use crate::picker::MeshPicker;
use crate::raycast::Ray;

/// How long the delete confirmation prompt stays up
pub const CONFIRM_DELETE_MS: u32 = 2000;

/// Where a click landed while a target selection is armed
#[derive(Debug, Clone, PartialEq)]
pub enum ClickTarget {
    /// The 3D viewport
    Canvas,
    /// A material card, by SKU
    MaterialCard { sku: String },
    Elsewhere,
}

/// Everything the UI and the renderer can ask of the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    ActivateMaterial { sku: String },
    /// Pointer ray in model space, `None` when the pointer is off the model view
    PointerMoved { ray: Option<Ray> },
    Click { target: ClickTarget },
    RemoveBinding { mesh: MeshId },
    ClearBindings,
    SavePreset,
    LoadPreset { index: usize },
    DeletePreset { index: usize },
    ModelReplaced,
}

/// Armed "pick a target mesh for this SKU" interaction
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSelection {
    sku: String,
}

impl TargetSelection {
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Close the selection on the highlighted mesh, if there is one
    fn commit(self, picker: &mut MeshPicker, model: &mut LoadedModel) -> Option<Binding> {
        let target = picker.current_highlighted().cloned();
        picker.deactivate(model);
        target.map(|mesh| Binding::new(mesh, self.sku))
    }

    fn cancel(self, picker: &mut MeshPicker, model: &mut LoadedModel) {
        picker.deactivate(model);
    }
}

pub struct PresetOrchestrator {
    store: BindingStore,
    picker: MeshPicker,
    applier: MaterialApplier,
    selection: Option<TargetSelection>,
    notifications: VecDeque<Notification>,
}

impl PresetOrchestrator {
    pub fn new(store: BindingStore, picker: MeshPicker, applier: MaterialApplier) -> Self {
        Self {
            store,
            picker,
            applier,
            selection: None,
            notifications: VecDeque::new(),
        }
    }

    pub fn store(&self) -> &BindingStore {
        &self.store
    }

    pub fn bindings(&self) -> &[Binding] {
        self.store.bindings()
    }

    pub fn presets(&self) -> &[Preset] {
        self.store.presets()
    }

    pub fn picker(&self) -> &MeshPicker {
        &self.picker
    }

    pub fn applier(&self) -> &MaterialApplier {
        &self.applier
    }

    pub fn selection(&self) -> Option<&TargetSelection> {
        self.selection.as_ref()
    }

    /// Drain queued notifications
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain(..).collect()
    }

    fn notify(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    /// Handle one intent. Returns the applies the renderer must fulfil.
    pub fn dispatch(&mut self, intent: Intent, model: &mut LoadedModel) -> Vec<ApplyRequest> {
        match intent {
            Intent::ActivateMaterial { sku } => {
                self.activate_material(sku, model);
                Vec::new()
            }
            Intent::PointerMoved { ray } => {
                self.picker.pointer_moved(ray.as_ref(), model);
                Vec::new()
            }
            Intent::Click { target } => self.click(target, model),
            Intent::RemoveBinding { mesh } => {
                self.remove_binding(&mesh, model);
                Vec::new()
            }
            Intent::ClearBindings => {
                self.clear_bindings(model);
                Vec::new()
            }
            Intent::SavePreset => {
                self.save_preset(model);
                Vec::new()
            }
            Intent::LoadPreset { index } => self.load_preset(index, model),
            Intent::DeletePreset { index } => {
                self.delete_preset(index);
                Vec::new()
            }
            Intent::ModelReplaced => {
                self.model_replaced();
                Vec::new()
            }
        }
    }

    fn activate_material(&mut self, sku: String, model: &mut LoadedModel) {
        if let Some(previous) = self.selection.take() {
            debug!(from = %previous.sku, to = %sku, "Re-arming target selection");
            previous.cancel(&mut self.picker, model);
        }
        debug!(sku = %sku, "Target selection armed");
        self.picker.activate();
        self.selection = Some(TargetSelection { sku });
    }

    fn click(&mut self, target: ClickTarget, model: &mut LoadedModel) -> Vec<ApplyRequest> {
        let Some(selection) = self.selection.take() else {
            return Vec::new();
        };

        match target {
            ClickTarget::MaterialCard { sku } if sku == selection.sku => {
                // Clicking the originating card keeps waiting for a real target
                self.selection = Some(selection);
                Vec::new()
            }
            ClickTarget::MaterialCard { sku } => {
                selection.cancel(&mut self.picker, model);
                self.activate_material(sku, model);
                Vec::new()
            }
            ClickTarget::Canvas => match selection.commit(&mut self.picker, model) {
                Some(binding) => self.bind(binding, model),
                None => {
                    debug!("Canvas click without a highlighted mesh, selection cancelled");
                    Vec::new()
                }
            },
            ClickTarget::Elsewhere => {
                debug!(sku = %selection.sku, "Target selection cancelled");
                selection.cancel(&mut self.picker, model);
                Vec::new()
            }
        }
    }

    fn bind(&mut self, binding: Binding, model: &mut LoadedModel) -> Vec<ApplyRequest> {
        let Binding { mesh, sku } = binding;
        let change = self.store.add_or_replace(mesh.clone(), &sku);
        self.notify(match change {
            BindingChange::Added => Notification::success("Binding added"),
            BindingChange::Updated => Notification::info("Binding updated"),
        });
        self.apply(&mesh, &sku, model).into_iter().collect()
    }

    fn apply(&mut self, mesh: &MeshId, sku: &str, model: &mut LoadedModel) -> Option<ApplyRequest> {
        match self.applier.begin(model, mesh, sku, ApplyOptions::default()) {
            Ok(ApplyStart::Pending(request)) => Some(request),
            Ok(ApplyStart::Applied) => None,
            Err(e) => {
                warn!(mesh = %mesh, sku = %sku, error = %e, "Cannot apply material");
                self.notify(Notification::error(e.to_string()));
                None
            }
        }
    }

    fn remove_binding(&mut self, mesh: &MeshId, model: &mut LoadedModel) {
        if self.store.remove(mesh) {
            debug!(mesh = %mesh, "Binding removed");
            self.applier.restore(model, mesh);
            self.notify(Notification::info("Binding removed"));
        }
    }

    fn clear_bindings(&mut self, model: &mut LoadedModel) {
        self.store.clear_all();
        self.reset_model(model);
        self.notify(Notification::info("All bindings cleared"));
    }

    fn save_preset(&mut self, model: &mut LoadedModel) {
        match self.store.save_preset() {
            Ok(index) => {
                info!(preset = index, "Preset saved");
                self.reset_model(model);
                self.notify(Notification::success("Preset saved"));
            }
            Err(e) => self.notify(Notification::error(e.to_string())),
        }
    }

    fn load_preset(&mut self, index: usize, model: &mut LoadedModel) -> Vec<ApplyRequest> {
        let Some(bindings) = self.store.load_preset(index) else {
            return Vec::new();
        };
        let bindings = bindings.to_vec();
        let requests = self.replay(&bindings, model);
        self.notify(Notification::info("Preset loaded"));
        requests
    }

    fn delete_preset(&mut self, index: usize) {
        match self.store.delete_preset(index) {
            DeleteOutcome::Armed => self.notify(
                Notification::error("Click again to confirm deletion").with_duration(CONFIRM_DELETE_MS),
            ),
            DeleteOutcome::Deleted(_) => {
                info!(preset = index, "Preset deleted");
                self.notify(Notification::info("Preset deleted"));
            }
            DeleteOutcome::OutOfRange => {}
        }
    }

    fn model_replaced(&mut self) {
        self.picker.invalidate();
        self.applier.invalidate_all();
    }

    fn reset_model(&mut self, model: &mut LoadedModel) {
        self.applier.invalidate_all();
        model.reset_to_placeholder();
    }

    /// Reset every mesh, then apply each binding in order.
    ///
    /// Bindings whose mesh is not in the model are logged and skipped.
    pub fn replay(&mut self, bindings: &[Binding], model: &mut LoadedModel) -> Vec<ApplyRequest> {
        self.reset_model(model);
        let mut requests = Vec::new();
        for binding in bindings {
            match self.applier.begin(model, &binding.mesh, &binding.sku, ApplyOptions::default()) {
                Ok(ApplyStart::Pending(request)) => requests.push(request),
                Ok(ApplyStart::Applied) => {}
                Err(e) => warn!(mesh = %binding.mesh, sku = %binding.sku, error = %e, "Skipping binding"),
            }
        }
        requests
    }

    /// Feed back the outcome of an apply request
    pub fn complete_apply(&mut self, model: &mut LoadedModel, request: &ApplyRequest, resolved: &ResolvedTextures) {
        match self.applier.complete(model, request, resolved) {
            Ok(()) => {}
            Err(ApplyError::Stale { mesh, generation }) => {
                debug!(mesh = %mesh, generation, "Discarding superseded apply");
            }
            Err(e) => {
                warn!(sku = %request.sku, error = %e, "Apply failed");
                self.notify(Notification::error(e.to_string()));
            }
        }
    }
}

impl Default for PresetOrchestrator {
    fn default() -> Self {
        Self::new(BindingStore::new(), MeshPicker::new(), MaterialApplier::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{MaterialChannel, PbrSettings};
    use crate::model::tests::sample_model;
    use crate::model::MaterialSlot;
    use crate::notification::NotificationLevel;
    use glam::Vec3;

    fn hover(orchestrator: &mut PresetOrchestrator, model: &mut LoadedModel, x: f32, y: f32) {
        let ray = Ray::new(Vec3::new(x, y, 5.0), Vec3::NEG_Z);
        orchestrator.dispatch(Intent::PointerMoved { ray: Some(ray) }, model);
    }

    fn click(orchestrator: &mut PresetOrchestrator, model: &mut LoadedModel, target: ClickTarget) -> Vec<ApplyRequest> {
        orchestrator.dispatch(Intent::Click { target }, model)
    }

    fn resolved() -> ResolvedTextures {
        ResolvedTextures {
            settings: None,
            color_loaded: true,
            loaded: [MaterialChannel::Normal].into_iter().collect(),
        }
    }

    fn complete_all(orchestrator: &mut PresetOrchestrator, model: &mut LoadedModel, requests: &[ApplyRequest]) {
        for request in requests {
            orchestrator.complete_apply(model, request, &resolved());
        }
    }

    fn pick(orchestrator: &mut PresetOrchestrator, model: &mut LoadedModel, sku: &str, x: f32, y: f32) -> Vec<ApplyRequest> {
        orchestrator.dispatch(Intent::ActivateMaterial { sku: sku.to_string() }, model);
        hover(orchestrator, model, x, y);
        click(orchestrator, model, ClickTarget::Canvas)
    }

    #[test]
    fn test_canvas_click_binds_highlighted_mesh() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();

        let requests = pick(&mut orchestrator, &mut model, "TILE_001", 0.5, 0.5);
        assert_eq!(requests.len(), 1);
        assert_eq!(orchestrator.bindings(), &[Binding::new(MeshId::from("mesh_7"), "TILE_001")]);
        assert!(!orchestrator.picker().is_active());
        assert!(orchestrator.selection().is_none());

        complete_all(&mut orchestrator, &mut model, &requests);
        assert_eq!(
            model.get(&MeshId::from("mesh_7")).unwrap().material.texture_path(),
            Some("/materials/TILE_001/TILE_001_Color.png")
        );
        let notes = orchestrator.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Success);
    }

    #[test]
    fn test_rebinding_reports_update() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        pick(&mut orchestrator, &mut model, "A", 0.5, 0.5);
        pick(&mut orchestrator, &mut model, "B", 0.5, 0.5);

        assert_eq!(orchestrator.bindings().len(), 1);
        assert_eq!(orchestrator.bindings()[0].sku, "B");
        let notes = orchestrator.take_notifications();
        assert_eq!(notes[1].level, NotificationLevel::Info);
    }

    #[test]
    fn test_click_on_originating_card_keeps_selection() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        orchestrator.dispatch(Intent::ActivateMaterial { sku: "A".into() }, &mut model);

        click(&mut orchestrator, &mut model, ClickTarget::MaterialCard { sku: "A".into() });
        assert_eq!(orchestrator.selection().map(|s| s.sku()), Some("A"));
        assert!(orchestrator.picker().is_active());

        hover(&mut orchestrator, &mut model, 3.5, 0.5);
        click(&mut orchestrator, &mut model, ClickTarget::Canvas);
        assert_eq!(orchestrator.bindings()[0].mesh, MeshId::from("wall"));
    }

    #[test]
    fn test_click_elsewhere_cancels() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        orchestrator.dispatch(Intent::ActivateMaterial { sku: "A".into() }, &mut model);
        hover(&mut orchestrator, &mut model, 0.5, 0.5);

        let requests = click(&mut orchestrator, &mut model, ClickTarget::Elsewhere);
        assert!(requests.is_empty());
        assert!(orchestrator.bindings().is_empty());
        assert!(orchestrator.selection().is_none());
        assert!(model.meshes().all(|m| !m.is_highlighted()));

        // Later canvas clicks are not interpreted
        click(&mut orchestrator, &mut model, ClickTarget::Canvas);
        assert!(orchestrator.bindings().is_empty());
    }

    #[test]
    fn test_canvas_click_on_empty_space_cancels() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        let requests = pick(&mut orchestrator, &mut model, "A", -9.0, -9.0);
        assert!(requests.is_empty());
        assert!(orchestrator.bindings().is_empty());
        assert!(orchestrator.selection().is_none());
    }

    #[test]
    fn test_other_card_rearms_with_new_sku() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        orchestrator.dispatch(Intent::ActivateMaterial { sku: "A".into() }, &mut model);
        click(&mut orchestrator, &mut model, ClickTarget::MaterialCard { sku: "B".into() });

        assert_eq!(orchestrator.selection().map(|s| s.sku()), Some("B"));
        assert!(orchestrator.picker().is_active());
        hover(&mut orchestrator, &mut model, 0.5, 0.5);
        click(&mut orchestrator, &mut model, ClickTarget::Canvas);
        assert_eq!(orchestrator.bindings()[0].sku, "B");
    }

    #[test]
    fn test_save_then_load_replays() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        let requests = pick(&mut orchestrator, &mut model, "TILE_001", 0.5, 0.5);
        complete_all(&mut orchestrator, &mut model, &requests);

        orchestrator.dispatch(Intent::SavePreset, &mut model);
        assert_eq!(orchestrator.presets().len(), 1);
        assert!(orchestrator.bindings().is_empty());
        assert!(model.meshes().all(|m| m.material == MaterialSlot::Placeholder));

        let requests = orchestrator.dispatch(Intent::LoadPreset { index: 0 }, &mut model);
        assert_eq!(orchestrator.bindings(), &[Binding::new(MeshId::from("mesh_7"), "TILE_001")]);
        complete_all(&mut orchestrator, &mut model, &requests);

        let bound = model.get(&MeshId::from("mesh_7")).unwrap();
        assert!(bound.material.texture_path().unwrap().contains("TILE_001"));
    }

    #[test]
    fn test_replay_resets_unbound_meshes() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        let requests = pick(&mut orchestrator, &mut model, "A", 3.5, 0.5);
        complete_all(&mut orchestrator, &mut model, &requests);
        orchestrator.dispatch(Intent::ClearBindings, &mut model);

        let requests = pick(&mut orchestrator, &mut model, "B", 0.5, 0.5);
        complete_all(&mut orchestrator, &mut model, &requests);
        orchestrator.dispatch(Intent::SavePreset, &mut model);

        // Decorate another mesh, then load: only the preset's mesh keeps a texture
        let requests = pick(&mut orchestrator, &mut model, "C", 3.5, 0.5);
        complete_all(&mut orchestrator, &mut model, &requests);
        let requests = orchestrator.dispatch(Intent::LoadPreset { index: 0 }, &mut model);
        complete_all(&mut orchestrator, &mut model, &requests);

        for mesh in model.meshes() {
            if mesh.id.as_str() == "mesh_7" {
                assert!(mesh.material.texture_path().unwrap().contains("/B/"));
            } else {
                assert!(mesh.material.is_default(), "{} kept a material", mesh.id);
            }
        }
    }

    #[test]
    fn test_replay_skips_missing_meshes() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        let bindings = vec![
            Binding::new(MeshId::from("gone"), "A"),
            Binding::new(MeshId::from("floor"), "B"),
        ];

        let requests = orchestrator.replay(&bindings, &mut model);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].ticket.mesh, MeshId::from("floor"));
        assert!(orchestrator.take_notifications().is_empty());
    }

    #[test]
    fn test_save_empty_reports_error() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        orchestrator.dispatch(Intent::SavePreset, &mut model);

        assert!(orchestrator.presets().is_empty());
        let notes = orchestrator.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Error);
    }

    #[test]
    fn test_delete_needs_two_clicks() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        pick(&mut orchestrator, &mut model, "A", 0.5, 0.5);
        orchestrator.dispatch(Intent::SavePreset, &mut model);
        orchestrator.take_notifications();

        orchestrator.dispatch(Intent::DeletePreset { index: 0 }, &mut model);
        assert_eq!(orchestrator.presets().len(), 1);
        let notes = orchestrator.take_notifications();
        assert_eq!(notes[0].duration_ms, Some(CONFIRM_DELETE_MS));

        orchestrator.dispatch(Intent::DeletePreset { index: 0 }, &mut model);
        assert!(orchestrator.presets().is_empty());
    }

    #[test]
    fn test_remove_restores_original() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        let requests = pick(&mut orchestrator, &mut model, "A", 0.5, 0.5);
        complete_all(&mut orchestrator, &mut model, &requests);

        orchestrator.dispatch(Intent::RemoveBinding { mesh: MeshId::from("mesh_7") }, &mut model);
        assert!(orchestrator.bindings().is_empty());
        assert_eq!(
            model.get(&MeshId::from("mesh_7")).unwrap().material,
            MaterialSlot::Placeholder
        );
    }

    #[test]
    fn test_model_replaced_keeps_bindings_without_replay() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        let requests = pick(&mut orchestrator, &mut model, "A", 0.5, 0.5);

        let mut replacement = sample_model();
        let follow_up = orchestrator.dispatch(Intent::ModelReplaced, &mut replacement);
        assert!(follow_up.is_empty());
        assert_eq!(orchestrator.bindings().len(), 1);

        // The in-flight apply belonged to the old model
        complete_all(&mut orchestrator, &mut replacement, &requests);
        assert!(replacement.meshes().all(|m| m.material.is_default()));
    }

    #[test]
    fn test_late_texture_after_reassignment_is_dropped() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        let first = pick(&mut orchestrator, &mut model, "SLOW", 0.5, 0.5);
        let second = pick(&mut orchestrator, &mut model, "FAST", 0.5, 0.5);

        complete_all(&mut orchestrator, &mut model, &second);
        complete_all(&mut orchestrator, &mut model, &first);
        assert!(model
            .get(&MeshId::from("mesh_7"))
            .unwrap()
            .material
            .texture_path()
            .unwrap()
            .contains("FAST"));
    }

    #[test]
    fn test_preview_config_reaches_bound_material() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();

        let requests = pick(&mut orchestrator, &mut model, "CRISTAL", 0.5, 0.5);
        let glass = ResolvedTextures {
            settings: Some(PbrSettings {
                is_glass: true,
                tiling: Some(2.0),
                ..Default::default()
            }),
            ..resolved()
        };
        orchestrator.complete_apply(&mut model, &requests[0], &glass);
        let node = model.get(&MeshId::from("mesh_7")).unwrap();
        assert_eq!(node.material, MaterialSlot::Glass);
        assert!(!node.casts_shadows);

        let requests = pick(&mut orchestrator, &mut model, "OAK", 3.5, 0.5);
        let tiled = ResolvedTextures {
            settings: Some(PbrSettings {
                tiling: Some(2.0),
                offset: Some(0.1),
                metalness: Some(0.9),
                ..Default::default()
            }),
            ..resolved()
        };
        orchestrator.complete_apply(&mut model, &requests[0], &tiled);
        let MaterialSlot::Textured(material) = &model.get(&MeshId::from("wall")).unwrap().material else {
            panic!("expected textured material");
        };
        assert_eq!(material.tiling.tiling, 2.0);
        assert_eq!(material.tiling.offset, 0.1);
        assert_eq!(material.params.metalness, 0.9);
        assert!(model.get(&MeshId::from("wall")).unwrap().casts_shadows);
    }

    #[test]
    fn test_armed_delete_waits_for_second_click() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();
        for sku in ["A", "B"] {
            pick(&mut orchestrator, &mut model, sku, 0.5, 0.5);
            orchestrator.dispatch(Intent::SavePreset, &mut model);
        }

        orchestrator.dispatch(Intent::DeletePreset { index: 1 }, &mut model);
        assert!(orchestrator.store().is_armed(1));

        // The prompt's duration only affects the toast; the row stays armed
        // through unrelated work until it is clicked again
        pick(&mut orchestrator, &mut model, "C", 3.5, 0.5);
        orchestrator.dispatch(Intent::LoadPreset { index: 0 }, &mut model);
        assert!(orchestrator.store().is_armed(1));
        assert!(!orchestrator.store().is_armed(0));

        orchestrator.dispatch(Intent::DeletePreset { index: 1 }, &mut model);
        assert_eq!(orchestrator.presets().len(), 1);
        assert_eq!(orchestrator.presets()[0].bindings()[0].sku, "A");
    }

    #[test]
    fn test_notification_wording() {
        let mut model = sample_model();
        let mut orchestrator = PresetOrchestrator::default();

        pick(&mut orchestrator, &mut model, "A", 0.5, 0.5);
        pick(&mut orchestrator, &mut model, "B", 0.5, 0.5);
        orchestrator.dispatch(Intent::RemoveBinding { mesh: MeshId::from("mesh_7") }, &mut model);
        orchestrator.dispatch(Intent::SavePreset, &mut model);
        pick(&mut orchestrator, &mut model, "C", 0.5, 0.5);
        orchestrator.dispatch(Intent::ClearBindings, &mut model);
        pick(&mut orchestrator, &mut model, "D", 0.5, 0.5);
        orchestrator.dispatch(Intent::SavePreset, &mut model);
        orchestrator.dispatch(Intent::LoadPreset { index: 0 }, &mut model);
        orchestrator.dispatch(Intent::DeletePreset { index: 0 }, &mut model);
        orchestrator.dispatch(Intent::DeletePreset { index: 0 }, &mut model);

        let messages: Vec<_> = orchestrator
            .take_notifications()
            .into_iter()
            .map(|n| (n.level, n.message))
            .collect();
        let expected = [
            (NotificationLevel::Success, "Binding added"),
            (NotificationLevel::Info, "Binding updated"),
            (NotificationLevel::Info, "Binding removed"),
            (NotificationLevel::Error, "No bindings to save"),
            (NotificationLevel::Success, "Binding added"),
            (NotificationLevel::Info, "All bindings cleared"),
            (NotificationLevel::Success, "Binding added"),
            (NotificationLevel::Success, "Preset saved"),
            (NotificationLevel::Info, "Preset loaded"),
            (NotificationLevel::Error, "Click again to confirm deletion"),
            (NotificationLevel::Info, "Preset deleted"),
        ];
        let expected: Vec<_> = expected.iter().map(|(l, m)| (*l, m.to_string())).collect();
        assert_eq!(messages, expected);
    }
}
