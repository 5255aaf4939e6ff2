//! Admin panels using bevy_egui
//!
//! Panels never touch the orchestrator directly: every user action becomes an
//! [`Intent`] queued on [`PendingIntents`] or a catalog call started through
//! [`CatalogRequests`]. Results of catalog calls are folded back into
//! [`PanelState`] by `poll_catalog_requests`.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use chrono::Utc;
use tracing::{info, warn};
use std::ops::RangeInclusive;
use vitrina_catalog::{MaterialSummary, ProjectSummary};
use vitrina_core::experience::{can_finish, viewer_link};
use vitrina_core::{
    Binding, ClickTarget, ExperiencePayload, Intent, LoadedModel, MaterialEdit, MaterialKind, MaterialParams,
    MaterialResource, Notification, PbrSettings, TargetSelection,
};
use vitrina_scene::apply::ApplyJobs;
use vitrina_scene::{Catalog, ModelState, PendingIntents, Presets, SceneNotifications, TaskSpawner, ViewerModel};

use crate::file_picker::{trigger_file_open, FileFilter, PendingFileResults};
use crate::requests::{self, CatalogRequests};
use crate::upload::UploadState;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PanelState>()
            .init_resource::<PanelSettings>()
            .init_resource::<CatalogRequests>()
            .add_systems(Startup, request_catalog)
            .add_systems(Update, poll_catalog_requests)
            // Main UI system runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
            .add_systems(EguiPrimaryContextPass, ui_system);
    }
}

/// Settings the panels read but never change
#[derive(Resource, Debug, Clone)]
pub struct PanelSettings {
    /// Base of the public viewer link shown after publishing
    pub link_base: String,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            link_base: crate::config::ViewerConfig::default().link_base,
        }
    }
}

/// Editable copy of a material record
#[derive(Debug, Clone, Default)]
pub struct MaterialInfoForm {
    pub sku: String,
    pub record: Option<MaterialResource>,
    pub name: String,
    pub format: String,
    /// Comma separated
    pub tags: String,
    /// Preview tuning being edited
    pub pbr: PbrSettings,
    pub loading: bool,
    pub saving: bool,
    pub saving_pbr: bool,
    /// Delete was clicked once and waits for confirmation
    pub delete_armed: bool,
    pub deleting: bool,
    pub error: Option<String>,
}

impl MaterialInfoForm {
    fn loading(sku: &str) -> Self {
        Self {
            sku: sku.to_string(),
            loading: true,
            ..default()
        }
    }

    fn fill(&mut self, record: MaterialResource) {
        self.name = record.name.clone();
        self.format = record.format.clone().unwrap_or_default();
        self.tags = record.tags.join(", ");
        self.pbr = record.pbr_settings.clone().unwrap_or_default();
        self.record = Some(record);
        self.loading = false;
        self.error = None;
    }

    pub fn edit(&self) -> MaterialEdit {
        MaterialEdit::from_form(&self.name, &self.format, &self.tags)
    }

    /// Whether the preview settings differ from the stored record
    pub fn pbr_changed(&self) -> bool {
        self.record
            .as_ref()
            .is_some_and(|r| r.pbr_settings.clone().unwrap_or_default() != self.pbr)
    }

    /// Register a click on Delete. Returns true on the confirming click.
    pub fn click_delete(&mut self) -> bool {
        if self.delete_armed {
            return true;
        }
        self.delete_armed = true;
        false
    }
}

#[derive(Resource, Default)]
pub struct PanelState {
    pub materials: Vec<MaterialSummary>,
    pub materials_loading: bool,
    pub materials_error: Option<String>,
    pub filter: String,
    pub info: Option<MaterialInfoForm>,
    /// Experience id of the publish request in flight
    pub publishing: Option<String>,
    pub viewer_link: Option<String>,
    /// Published experiences
    pub projects: Vec<ProjectSummary>,
    pub projects_loading: bool,
    pub projects_error: Option<String>,
    /// The list misses a change made from this panel
    pub projects_stale: bool,
    /// Project whose Delete was clicked once
    pub project_armed: Option<String>,
}

/// Grouped system parameters for the main UI system
#[derive(SystemParam)]
pub struct UiParams<'w, 's> {
    pub contexts: EguiContexts<'w, 's>,
    pub presets: Res<'w, Presets>,
    pub viewer: Res<'w, ViewerModel>,
    pub jobs: Res<'w, ApplyJobs>,
    pub intents: ResMut<'w, PendingIntents>,
    pub panel: ResMut<'w, PanelState>,
    pub settings: Res<'w, PanelSettings>,
    pub upload: Res<'w, UploadState>,
    pub pending_files: Res<'w, PendingFileResults>,
    pub slots: Res<'w, CatalogRequests>,
    pub catalog: Option<Res<'w, Catalog>>,
    pub spawner: Option<Res<'w, TaskSpawner>>,
    pub notifications: ResMut<'w, SceneNotifications>,
}

/// Something the user asked for this frame
#[derive(Debug, Clone, PartialEq)]
enum UiAction {
    Dispatch(Intent),
    PickModel,
    RefreshMaterials,
    OpenInfo(String),
    SaveInfo,
    SavePbr,
    DeleteMaterial(String),
    CloseInfo,
    Finish,
    RefreshProjects,
    ArmProjectDelete(String),
    DeleteProject(String),
}

/// Intent for a click on a material card
pub fn card_intent(selection: Option<&TargetSelection>, sku: &str) -> Intent {
    match selection {
        Some(_) => Intent::Click {
            target: ClickTarget::MaterialCard { sku: sku.to_string() },
        },
        None => Intent::ActivateMaterial { sku: sku.to_string() },
    }
}

/// Action for a click on a project's Delete button: the first click arms it
fn project_delete_action(armed: Option<&str>, id: &str) -> UiAction {
    if armed == Some(id) {
        UiAction::DeleteProject(id.to_string())
    } else {
        UiAction::ArmProjectDelete(id.to_string())
    }
}

/// Texture materials matching the filter. Models cannot be bound to meshes.
pub fn visible_materials<'a>(materials: &'a [MaterialSummary], filter: &str) -> Vec<&'a MaterialSummary> {
    materials
        .iter()
        .filter(|m| m.kind != Some(MaterialKind::Model))
        .filter(|m| m.matches(filter))
        .collect()
}

/// Row label of a binding: mesh name when the file has one, else its id
pub fn binding_label(model: &LoadedModel, binding: &Binding) -> String {
    let mesh = model
        .get(&binding.mesh)
        .map(|node| node.name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(binding.mesh.as_str());
    format!("{} \u{2192} {}", mesh, binding.sku)
}

fn request_catalog(
    mut panel: ResMut<PanelState>,
    slots: Res<CatalogRequests>,
    catalog: Option<Res<Catalog>>,
    spawner: Option<Res<TaskSpawner>>,
) {
    start_material_list(&mut panel, &slots, catalog.as_deref(), spawner.as_deref());
    start_project_list(&mut panel, &slots, catalog.as_deref(), spawner.as_deref());
}

fn start_material_list(
    panel: &mut PanelState,
    slots: &CatalogRequests,
    catalog: Option<&Catalog>,
    spawner: Option<&TaskSpawner>,
) {
    let (Some(catalog), Some(spawner)) = (catalog, spawner) else {
        panel.materials_error = Some("No catalog configured".to_string());
        return;
    };
    let client = catalog.0.clone();
    requests::spawn_into(spawner, &slots.materials, async move { client.list_materials().await });
    panel.materials_loading = true;
    panel.materials_error = None;
}

fn start_project_list(
    panel: &mut PanelState,
    slots: &CatalogRequests,
    catalog: Option<&Catalog>,
    spawner: Option<&TaskSpawner>,
) {
    panel.projects_stale = false;
    let (Some(catalog), Some(spawner)) = (catalog, spawner) else {
        panel.projects_error = Some("No catalog configured".to_string());
        return;
    };
    let client = catalog.0.clone();
    requests::spawn_into(spawner, &slots.projects, async move { client.list_projects().await });
    panel.projects_loading = true;
    panel.projects_error = None;
}

/// Fold finished catalog calls into the panel state
fn poll_catalog_requests(
    mut panel: ResMut<PanelState>,
    slots: Res<CatalogRequests>,
    settings: Res<PanelSettings>,
    mut notifications: ResMut<SceneNotifications>,
) {
    if let Some(result) = requests::take(&slots.materials) {
        panel.materials_loading = false;
        match result {
            Ok(materials) => {
                info!(count = materials.len(), "Materials loaded");
                panel.materials = materials;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load materials");
                notifications
                    .0
                    .push(Notification::error(format!("Failed to load materials: {}", e)));
                panel.materials_error = Some(e);
            }
        }
    }

    if let Some(result) = requests::take(&slots.material_info) {
        if let Some(form) = panel.info.as_mut() {
            match result {
                Ok(record) if record.id == form.sku || record.id.is_empty() => form.fill(record),
                Ok(record) => warn!(expected = %form.sku, got = %record.id, "Ignoring stale material record"),
                Err(e) => {
                    form.loading = false;
                    form.error = Some(e);
                }
            }
        }
    }

    if let Some(result) = requests::take(&slots.material_saved) {
        match result {
            Ok(sku) => {
                let edit = panel.info.as_ref().filter(|f| f.sku == sku).map(MaterialInfoForm::edit);
                if let Some(edit) = edit {
                    if let Some(summary) = panel.materials.iter_mut().find(|m| m.id == sku) {
                        summary.name = edit.name.clone();
                        summary.format = Some(edit.format.clone());
                        summary.tags = edit.tags.clone();
                    }
                }
                if let Some(form) = panel.info.as_mut() {
                    form.saving = false;
                }
                notifications
                    .0
                    .push(Notification::success(format!("Material {} updated", sku)));
            }
            Err(e) => {
                if let Some(form) = panel.info.as_mut() {
                    form.saving = false;
                    form.error = Some(e.clone());
                }
                notifications
                    .0
                    .push(Notification::error(format!("Failed to update material: {}", e)));
            }
        }
    }

    if let Some(result) = requests::take(&slots.pbr_saved) {
        match result {
            Ok((sku, stored)) => {
                if let Some(form) = panel.info.as_mut().filter(|f| f.sku == sku) {
                    form.saving_pbr = false;
                    form.pbr = stored.clone();
                    if let Some(record) = form.record.as_mut() {
                        record.pbr_settings = Some(stored);
                    }
                }
                notifications
                    .0
                    .push(Notification::success(format!("Preview settings of {} saved", sku)));
            }
            Err(e) => {
                if let Some(form) = panel.info.as_mut() {
                    form.saving_pbr = false;
                }
                notifications
                    .0
                    .push(Notification::error(format!("Failed to save preview settings: {}", e)));
            }
        }
    }

    if let Some(result) = requests::take(&slots.material_deleted) {
        match result {
            Ok(sku) => {
                panel.materials.retain(|m| m.id != sku);
                if panel.info.as_ref().is_some_and(|f| f.sku == sku) {
                    panel.info = None;
                }
                notifications
                    .0
                    .push(Notification::info(format!("Material {} deleted", sku)));
            }
            Err(e) => {
                if let Some(form) = panel.info.as_mut() {
                    form.deleting = false;
                    form.delete_armed = false;
                }
                notifications
                    .0
                    .push(Notification::error(format!("Failed to delete material: {}", e)));
            }
        }
    }

    if let Some(result) = requests::take(&slots.projects) {
        panel.projects_loading = false;
        match result {
            Ok(projects) => {
                info!(count = projects.len(), "Projects loaded");
                panel.projects = projects;
            }
            Err(e) => {
                warn!(error = %e, "Failed to load projects");
                panel.projects_error = Some(e);
            }
        }
    }

    if let Some(result) = requests::take(&slots.project_deleted) {
        panel.project_armed = None;
        match result {
            Ok(id) => {
                panel.projects.retain(|p| p.id != id);
                notifications.0.push(Notification::info("Experience deleted"));
            }
            Err(e) => {
                notifications
                    .0
                    .push(Notification::error(format!("Failed to delete experience: {}", e)));
            }
        }
    }

    if let Some(result) = requests::take(&slots.experience) {
        let experience_id = panel.publishing.take().unwrap_or_default();
        match result {
            Ok(folder) => {
                info!(experience = %experience_id, folder = %folder, "Experience published");
                panel.viewer_link = Some(viewer_link(&settings.link_base, &experience_id));
                panel.projects_stale = true;
                notifications
                    .0
                    .push(Notification::success("Experience created"));
            }
            Err(e) => {
                warn!(experience = %experience_id, error = %e, "Failed to publish experience");
                notifications
                    .0
                    .push(Notification::error(format!("Failed to create experience: {}", e)));
            }
        }
    }
}

fn ui_system(mut params: UiParams) {
    let Ok(ctx) = params.contexts.ctx_mut() else { return };

    let mut actions = Vec::new();
    let selection = params.presets.selection();
    if params.panel.projects_stale && !params.panel.projects_loading {
        actions.push(UiAction::RefreshProjects);
    }

    egui::SidePanel::left("materials_panel")
        .default_width(300.0)
        .show(ctx, |ui| {
            ui.heading("Model");
            ui.separator();
            model_section(ui, &params.viewer, &params.upload, &mut actions);

            ui.add_space(8.0);
            ui.heading("Materials");
            ui.separator();
            materials_section(ui, &mut params.panel, selection, &mut actions);
        });

    egui::SidePanel::right("bindings_panel")
        .default_width(280.0)
        .show(ctx, |ui| {
            ui.heading("Bindings");
            ui.separator();
            bindings_section(ui, &params.presets, &params.viewer.model, &params.jobs, &mut actions);

            ui.add_space(8.0);
            ui.heading("Presets");
            ui.separator();
            presets_section(ui, &params.presets, &mut actions);

            ui.add_space(8.0);
            ui.separator();
            finish_section(ui, &params.presets, &params.panel, &mut actions);

            ui.add_space(8.0);
            ui.heading("Experiences");
            ui.separator();
            experiences_section(ui, &params.panel, &params.settings, &mut actions);
        });

    if let Some(form) = params.panel.info.as_mut() {
        info_window(ctx, form, &mut actions);
    }

    // Any panel click outside the material cards ends an armed selection
    let clicked_panel = ctx.input(|i| i.pointer.any_click()) && ctx.is_pointer_over_area();
    let card_clicked = actions
        .iter()
        .any(|a| matches!(a, UiAction::Dispatch(Intent::ActivateMaterial { .. } | Intent::Click { .. })));
    if selection.is_some() && clicked_panel && !card_clicked {
        params.intents.push(Intent::Click {
            target: ClickTarget::Elsewhere,
        });
    }

    for action in actions {
        match action {
            UiAction::Dispatch(intent) => params.intents.push(intent),
            UiAction::PickModel => trigger_file_open(&params.pending_files, FileFilter::models()),
            UiAction::RefreshMaterials => start_material_list(
                &mut params.panel,
                &params.slots,
                params.catalog.as_deref(),
                params.spawner.as_deref(),
            ),
            UiAction::OpenInfo(sku) => open_info(&mut params, &sku),
            UiAction::SaveInfo => save_info(&mut params),
            UiAction::SavePbr => save_pbr(&mut params),
            UiAction::DeleteMaterial(sku) => delete_material(&mut params, &sku),
            UiAction::CloseInfo => params.panel.info = None,
            UiAction::Finish => finish_experience(&mut params),
            UiAction::RefreshProjects => start_project_list(
                &mut params.panel,
                &params.slots,
                params.catalog.as_deref(),
                params.spawner.as_deref(),
            ),
            UiAction::ArmProjectDelete(id) => params.panel.project_armed = Some(id),
            UiAction::DeleteProject(id) => delete_project(&mut params, &id),
        }
    }
}

fn model_section(ui: &mut egui::Ui, viewer: &ViewerModel, upload: &UploadState, actions: &mut Vec<UiAction>) {
    match &viewer.state {
        ModelState::Empty => {
            ui.label("No model loaded");
        }
        ModelState::Loading(_) | ModelState::Spawning => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading model...");
            });
        }
        ModelState::Ready => {
            let name = viewer
                .source
                .as_deref()
                .and_then(|s| s.rsplit('/').next())
                .unwrap_or("model");
            ui.label(format!("{} ({} meshes)", name, viewer.model.len()));
        }
        ModelState::Failed(e) => {
            ui.colored_label(egui::Color32::RED, format!("Load failed: {}", e));
        }
    }

    if let Some(name) = &upload.in_progress {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(format!("Uploading {}", name));
        });
    } else if ui.button("Upload model").clicked() {
        actions.push(UiAction::PickModel);
    }
}

fn materials_section(
    ui: &mut egui::Ui,
    panel: &mut PanelState,
    selection: Option<&TargetSelection>,
    actions: &mut Vec<UiAction>,
) {
    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::singleline(&mut panel.filter)
                .hint_text("Search SKU, name or color")
                .desired_width(200.0),
        );
        if panel.materials_loading {
            ui.spinner();
        } else if ui.button("\u{27F3}").on_hover_text("Reload").clicked() {
            actions.push(UiAction::RefreshMaterials);
        }
    });

    if let Some(selection) = selection {
        ui.colored_label(
            egui::Color32::from_rgb(46, 160, 67),
            format!("Click a surface to apply {}", selection.sku()),
        );
    }
    if let Some(e) = &panel.materials_error {
        ui.colored_label(egui::Color32::RED, e);
    }

    egui::ScrollArea::vertical().id_salt("materials").show(ui, |ui| {
        for material in visible_materials(&panel.materials, &panel.filter) {
            let armed = selection.is_some_and(|s| s.sku() == material.id);
            ui.horizontal(|ui| {
                let text = format!("{}\n{}", material.id, material.name);
                let card = egui::Button::new(text)
                    .selected(armed)
                    .min_size(egui::vec2(220.0, 36.0));
                if ui.add(card).clicked() {
                    actions.push(UiAction::Dispatch(card_intent(selection, &material.id)));
                }
                if ui.small_button("i").on_hover_text("Material info").clicked() {
                    actions.push(UiAction::OpenInfo(material.id.clone()));
                }
            });
            if let Some(color) = &material.color {
                ui.label(egui::RichText::new(color).small().weak());
            }
        }
    });
}

fn bindings_section(
    ui: &mut egui::Ui,
    presets: &Presets,
    model: &LoadedModel,
    jobs: &ApplyJobs,
    actions: &mut Vec<UiAction>,
) {
    let bindings = presets.bindings();
    if bindings.is_empty() {
        ui.label(egui::RichText::new("Pick a material, then click a surface").weak());
    }
    for binding in bindings {
        ui.horizontal(|ui| {
            ui.label(binding_label(model, binding));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("\u{2715}").on_hover_text("Remove").clicked() {
                    actions.push(UiAction::Dispatch(Intent::RemoveBinding {
                        mesh: binding.mesh.clone(),
                    }));
                }
            });
        });
    }
    if jobs.in_flight() > 0 {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(format!("Applying {} material(s)", jobs.in_flight()));
        });
    }

    ui.horizontal(|ui| {
        if ui
            .add_enabled(!bindings.is_empty(), egui::Button::new("Clear all"))
            .clicked()
        {
            actions.push(UiAction::Dispatch(Intent::ClearBindings));
        }
        if ui.button("Save preset").clicked() {
            actions.push(UiAction::Dispatch(Intent::SavePreset));
        }
    });
}

fn presets_section(ui: &mut egui::Ui, presets: &Presets, actions: &mut Vec<UiAction>) {
    if presets.presets().is_empty() {
        ui.label(egui::RichText::new("No presets saved").weak());
    }
    for (index, preset) in presets.presets().iter().enumerate() {
        ui.horizontal(|ui| {
            ui.label(format!("Preset {} ({} bindings)", index + 1, preset.len()));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let armed = presets.store().is_armed(index);
                let delete = if armed {
                    egui::Button::new(egui::RichText::new("Confirm").color(egui::Color32::WHITE))
                        .fill(egui::Color32::from_rgb(220, 53, 69))
                } else {
                    egui::Button::new("Delete")
                };
                if ui.add(delete).clicked() {
                    actions.push(UiAction::Dispatch(Intent::DeletePreset { index }));
                }
                if ui.button("Load").clicked() {
                    actions.push(UiAction::Dispatch(Intent::LoadPreset { index }));
                }
            });
        });
    }
}

fn finish_section(ui: &mut egui::Ui, presets: &Presets, panel: &PanelState, actions: &mut Vec<UiAction>) {
    let ready = can_finish(presets.presets()) && panel.publishing.is_none();
    ui.horizontal(|ui| {
        let button = ui
            .add_enabled(ready, egui::Button::new("Finish experience"))
            .on_disabled_hover_text("Save at least one preset first");
        if button.clicked() {
            actions.push(UiAction::Finish);
        }
        if panel.publishing.is_some() {
            ui.spinner();
        }
    });
    if let Some(link) = &panel.viewer_link {
        ui.label("Viewer link:");
        ui.hyperlink_to(link.as_str(), link.as_str());
    }
}

fn experiences_section(
    ui: &mut egui::Ui,
    panel: &PanelState,
    settings: &PanelSettings,
    actions: &mut Vec<UiAction>,
) {
    ui.horizontal(|ui| {
        ui.label(format!("{} published", panel.projects.len()));
        if panel.projects_loading {
            ui.spinner();
        } else if ui.button("\u{27F3}").on_hover_text("Reload").clicked() {
            actions.push(UiAction::RefreshProjects);
        }
    });
    if let Some(e) = &panel.projects_error {
        ui.colored_label(egui::Color32::RED, e);
    }

    egui::ScrollArea::vertical()
        .id_salt("experiences")
        .max_height(200.0)
        .show(ui, |ui| {
            for project in &panel.projects {
                ui.horizontal(|ui| {
                    let link = viewer_link(&settings.link_base, &project.id);
                    ui.hyperlink_to(project.name.as_str(), link)
                        .on_hover_text(project.date.as_deref().unwrap_or_default());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let armed = panel.project_armed.as_deref() == Some(project.id.as_str());
                        let delete = if armed {
                            egui::Button::new(egui::RichText::new("Confirm").color(egui::Color32::WHITE))
                                .fill(egui::Color32::from_rgb(220, 53, 69))
                        } else {
                            egui::Button::new("Delete")
                        };
                        if ui.add(delete).clicked() {
                            actions.push(project_delete_action(panel.project_armed.as_deref(), &project.id));
                        }
                    });
                });
            }
        });
}

/// Editor for a value the catalog may leave unset. Unchecked values are not stored.
fn optional_value(ui: &mut egui::Ui, label: &str, value: &mut Option<f32>, range: RangeInclusive<f32>, fallback: f32) {
    let mut set = value.is_some();
    ui.checkbox(&mut set, label);
    let mut current = value.unwrap_or(fallback);
    ui.add_enabled(set, egui::DragValue::new(&mut current).range(range).speed(0.01));
    *value = set.then_some(current);
    ui.end_row();
}

fn pbr_editor(ui: &mut egui::Ui, pbr: &mut PbrSettings) {
    let defaults = MaterialParams::default();
    egui::Grid::new("pbr_settings_grid").num_columns(2).show(ui, |ui| {
        optional_value(ui, "Metalness", &mut pbr.metalness, 0.0..=1.0, defaults.metalness);
        optional_value(ui, "Roughness", &mut pbr.roughness, 0.0..=1.0, defaults.roughness);
        optional_value(ui, "Normal scale", &mut pbr.normal_scale, 0.0..=5.0, defaults.normal_scale);
        optional_value(ui, "AO intensity", &mut pbr.ao_intensity, 0.0..=2.0, defaults.ao_intensity);
        optional_value(
            ui,
            "Displacement",
            &mut pbr.displacement_scale,
            -1.0..=1.0,
            defaults.displacement_scale,
        );
        optional_value(
            ui,
            "Displacement bias",
            &mut pbr.displacement_bias,
            -1.0..=1.0,
            defaults.displacement_bias,
        );
        optional_value(ui, "Tiling", &mut pbr.tiling, 0.01..=50.0, 1.0);
        optional_value(ui, "Offset", &mut pbr.offset, -1.0..=1.0, 0.0);
    });
    ui.checkbox(&mut pbr.is_glass, "Render as glass");
    ui.horizontal_wrapped(|ui| {
        ui.label("Maps:");
        ui.checkbox(&mut pbr.enable_color, "Color");
        ui.checkbox(&mut pbr.enable_normal, "Normal");
        ui.checkbox(&mut pbr.enable_roughness, "Roughness");
        ui.checkbox(&mut pbr.enable_metalness, "Metalness");
        ui.checkbox(&mut pbr.enable_ao, "AO");
    });
}

fn info_window(ctx: &egui::Context, form: &mut MaterialInfoForm, actions: &mut Vec<UiAction>) {
    let mut open = true;
    egui::Window::new(format!("Material {}", form.sku))
        .id(egui::Id::new("material_info"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            if form.loading {
                ui.spinner();
                return;
            }
            if let Some(e) = &form.error {
                ui.colored_label(egui::Color32::RED, e);
            }
            let Some(record) = form.record.clone() else {
                return;
            };

            egui::Grid::new("material_info_grid").num_columns(2).show(ui, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut form.name);
                ui.end_row();
                ui.label("Format");
                ui.text_edit_singleline(&mut form.format);
                ui.end_row();
                ui.label("Tags");
                ui.add(egui::TextEdit::singleline(&mut form.tags).hint_text("comma, separated"));
                ui.end_row();
                if let Some(color) = &record.color {
                    ui.label("Color");
                    ui.label(color);
                    ui.end_row();
                }
                if !record.recommended_objects.is_empty() {
                    ui.label("Recommended for");
                    ui.label(record.recommended_objects.join(", "));
                    ui.end_row();
                }
                if let Some(updated) = record.updated_at.as_ref().or(record.created_at.as_ref()) {
                    ui.label("Updated");
                    ui.label(updated);
                    ui.end_row();
                }
            });

            ui.add_space(4.0);
            ui.collapsing("Preview settings", |ui| {
                pbr_editor(ui, &mut form.pbr);
                ui.horizontal(|ui| {
                    let changed = form.pbr_changed();
                    if ui
                        .add_enabled(changed && !form.saving_pbr, egui::Button::new("Save preview settings"))
                        .clicked()
                    {
                        actions.push(UiAction::SavePbr);
                    }
                    if form.saving_pbr {
                        ui.spinner();
                    }
                });
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!form.saving, egui::Button::new("Save"))
                    .clicked()
                {
                    actions.push(UiAction::SaveInfo);
                }
                if form.saving {
                    ui.spinner();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let delete = if form.delete_armed {
                        egui::Button::new(egui::RichText::new("Confirm delete").color(egui::Color32::WHITE))
                            .fill(egui::Color32::from_rgb(220, 53, 69))
                    } else {
                        egui::Button::new("Delete material")
                    };
                    if ui.add_enabled(!form.deleting, delete).clicked() && form.click_delete() {
                        actions.push(UiAction::DeleteMaterial(form.sku.clone()));
                    }
                    if form.deleting {
                        ui.spinner();
                    }
                });
            });
        });
    if !open {
        actions.push(UiAction::CloseInfo);
    }
}

fn open_info(params: &mut UiParams, sku: &str) {
    let (Some(catalog), Some(spawner)) = (params.catalog.as_deref(), params.spawner.as_deref()) else {
        params
            .notifications
            .0
            .push(Notification::error("No catalog configured"));
        return;
    };
    let client = catalog.0.clone();
    let sku_owned = sku.to_string();
    requests::spawn_into(spawner, &params.slots.material_info, async move {
        client.get_material(&sku_owned).await
    });
    params.panel.info = Some(MaterialInfoForm::loading(sku));
}

fn save_info(params: &mut UiParams) {
    let Some(form) = params.panel.info.as_mut() else {
        return;
    };
    let (Some(catalog), Some(spawner)) = (params.catalog.as_deref(), params.spawner.as_deref()) else {
        return;
    };
    let client = catalog.0.clone();
    let sku = form.sku.clone();
    let edit = form.edit();
    requests::spawn_into(spawner, &params.slots.material_saved, async move {
        let result = client.update_material(&sku, &edit).await;
        result.map(|()| sku)
    });
    form.saving = true;
    form.error = None;
}

fn save_pbr(params: &mut UiParams) {
    let Some(form) = params.panel.info.as_mut() else {
        return;
    };
    let (Some(catalog), Some(spawner)) = (params.catalog.as_deref(), params.spawner.as_deref()) else {
        return;
    };
    let client = catalog.0.clone();
    let sku = form.sku.clone();
    let settings = form.pbr.clone();
    requests::spawn_into(spawner, &params.slots.pbr_saved, async move {
        let result = client.save_pbr_settings(&sku, &settings).await;
        result.map(|stored| (sku, stored))
    });
    form.saving_pbr = true;
}

fn delete_material(params: &mut UiParams, sku: &str) {
    let (Some(catalog), Some(spawner)) = (params.catalog.as_deref(), params.spawner.as_deref()) else {
        params
            .notifications
            .0
            .push(Notification::error("No catalog configured"));
        return;
    };
    info!(sku = %sku, "Deleting material");
    let client = catalog.0.clone();
    let sku_owned = sku.to_string();
    requests::spawn_into(spawner, &params.slots.material_deleted, async move {
        let result = client.delete_material(&sku_owned).await;
        result.map(|()| sku_owned)
    });
    if let Some(form) = params.panel.info.as_mut() {
        form.deleting = true;
    }
}

fn delete_project(params: &mut UiParams, id: &str) {
    let (Some(catalog), Some(spawner)) = (params.catalog.as_deref(), params.spawner.as_deref()) else {
        params
            .notifications
            .0
            .push(Notification::error("No catalog configured"));
        return;
    };
    info!(project = %id, "Deleting experience");
    let client = catalog.0.clone();
    let id_owned = id.to_string();
    requests::spawn_into(spawner, &params.slots.project_deleted, async move {
        let result = client.delete_project(&id_owned).await;
        result.map(|()| id_owned)
    });
}

fn finish_experience(params: &mut UiParams) {
    let payload = match ExperiencePayload::build(
        params.presets.presets(),
        params.upload.temp_model_path.as_deref(),
        Utc::now(),
    ) {
        Ok(payload) => payload,
        Err(e) => {
            params.notifications.0.push(Notification::error(e.to_string()));
            return;
        }
    };
    let (Some(catalog), Some(spawner)) = (params.catalog.as_deref(), params.spawner.as_deref()) else {
        params
            .notifications
            .0
            .push(Notification::error("No backend configured"));
        return;
    };

    info!(experience = %payload.experience_id, presets = payload.presets.len(), "Publishing experience");
    let client = catalog.0.clone();
    params.panel.publishing = Some(payload.experience_id.clone());
    params.panel.viewer_link = None;
    requests::spawn_into(spawner, &params.slots.experience, async move {
        client.create_experience(&payload).await
    });
}
