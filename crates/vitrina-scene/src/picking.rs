//! Pointer rays, canvas clicks and intent dispatch

use bevy::prelude::*;
use bevy_egui::EguiContexts;
use vitrina_core::{ClickTarget, Intent};

use crate::apply::ApplyJobs;
use crate::camera::MainCamera;
use crate::geometry::ray_to_model_space;
use crate::types::{PendingIntents, Presets, ViewerModel, ViewerSet};

/// Pointer travel (in logical pixels) below which a press/release is a click
pub const CLICK_SLOP: f32 = 5.0;

pub struct PickingInputPlugin;

impl Plugin for PickingInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingIntents>()
            .init_resource::<PointerState>()
            .add_systems(
                Update,
                (track_pointer, dispatch_intents).chain().in_set(ViewerSet::Input),
            );
    }
}

/// Press position of the current left-button gesture
#[derive(Resource, Default)]
pub struct PointerState {
    press_position: Option<Vec2>,
}

impl PointerState {
    /// Start a gesture; presses over egui panels are not tracked
    pub fn press(&mut self, cursor: Option<Vec2>, egui_wants_pointer: bool) {
        self.press_position = if egui_wants_pointer { None } else { cursor };
    }

    /// End the gesture and report whether it was a canvas click
    pub fn release(&mut self, cursor: Option<Vec2>, egui_wants_pointer: bool) -> bool {
        match (self.press_position.take(), cursor) {
            (Some(press), Some(release)) => !egui_wants_pointer && is_click(press, release),
            _ => false,
        }
    }
}

/// Whether a release at `release` after a press at `press` counts as a click
pub fn is_click(press: Vec2, release: Vec2) -> bool {
    press.distance(release) <= CLICK_SLOP
}

/// Feed the pointer ray to the picker and turn short presses into canvas clicks
fn track_pointer(
    windows: Query<&Window>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    viewer: Res<ViewerModel>,
    presets: Res<Presets>,
    mut pointer: ResMut<PointerState>,
    mut intents: ResMut<PendingIntents>,
    mut contexts: EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    let cursor = windows.single().ok().and_then(|w| w.cursor_position());

    if presets.picker().is_active() && viewer.is_ready() {
        let ray = match (cursor, camera_query.single()) {
            (Some(cursor), Ok((camera, camera_transform))) if !egui_wants_pointer => camera
                .viewport_to_world(camera_transform, cursor)
                .ok()
                .map(|ray| ray_to_model_space(ray.origin, *ray.direction, &viewer.root_transform)),
            _ => None,
        };
        intents.push(Intent::PointerMoved { ray });
    }

    if mouse_button.just_pressed(MouseButton::Left) {
        pointer.press(cursor, egui_wants_pointer);
    }
    if mouse_button.just_released(MouseButton::Left)
        && pointer.release(cursor, egui_wants_pointer)
        && presets.selection().is_some()
    {
        intents.push(Intent::Click {
            target: ClickTarget::Canvas,
        });
    }
}

/// Dispatch queued intents and hand the resulting applies to the job queue
fn dispatch_intents(
    mut intents: ResMut<PendingIntents>,
    mut presets: ResMut<Presets>,
    mut viewer: ResMut<ViewerModel>,
    mut jobs: ResMut<ApplyJobs>,
) {
    if intents.0.is_empty() {
        return;
    }
    for intent in std::mem::take(&mut intents.0) {
        let requests = presets.dispatch(intent, &mut viewer.model);
        jobs.queue(requests);
    }
}
