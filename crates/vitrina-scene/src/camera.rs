//! Orbit camera around the loaded model

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::types::Presets;

/// Camera controller settings
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Angle around the Y axis
    pub azimuth: f32,
    pub elevation: f32,
    pub target: Vec3,
    pub target_focus: Vec3,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            distance: 10.0,
            target_distance: 10.0,
            min_distance: 0.5,
            max_distance: 50.0,
            azimuth: 0.8,
            elevation: 0.5,
            target: Vec3::ZERO,
            target_focus: Vec3::ZERO,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
        }
    }
}

impl CameraSettings {
    /// Frame a model whose largest side is `max_dimension`, centred on the origin
    pub fn fit(&mut self, max_dimension: f32) {
        let size = max_dimension.max(0.01);
        self.target_distance = size * 2.0;
        self.min_distance = size * 0.1;
        self.max_distance = size * 10.0;
        self.target_focus = Vec3::ZERO;
    }
}

/// Camera offset from the orbit target (Y up)
pub fn orbit_offset(azimuth: f32, elevation: f32, distance: f32) -> Vec3 {
    Vec3::new(
        distance * azimuth.sin() * elevation.cos(),
        distance * elevation.sin(),
        distance * azimuth.cos() * elevation.cos(),
    )
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .add_systems(Update, update_camera);
    }
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut mouse_wheel: MessageReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    presets: Res<Presets>,
    mut contexts: EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    let total_motion: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    let total_scroll: f32 = mouse_wheel.read().map(|w| w.y).sum();

    if !egui_wants_pointer {
        // Left clicks pick a target while a selection is armed
        if mouse_button.pressed(MouseButton::Left) && presets.selection().is_none() {
            settings.azimuth -= total_motion.x * settings.sensitivity;
            settings.elevation = (settings.elevation + total_motion.y * settings.sensitivity).clamp(-1.5, 1.5);
        }

        // Pan in the camera's view plane
        if mouse_button.pressed(MouseButton::Right) {
            let right = Vec3::new(settings.azimuth.cos(), 0.0, -settings.azimuth.sin());
            let pan_speed = settings.distance * 0.002;
            let delta = (-right * total_motion.x + Vec3::Y * total_motion.y) * pan_speed;
            settings.target_focus += delta;
        }

        if total_scroll != 0.0 {
            let zoom_factor = 1.0 - total_scroll * settings.zoom_speed;
            settings.target_distance =
                (settings.target_distance * zoom_factor).clamp(settings.min_distance, settings.max_distance);
        }
    }

    let dt = time.delta_secs();
    let lerp_factor = 1.0 - (-settings.smooth_factor * 60.0 * dt).exp();
    settings.distance = settings.distance + (settings.target_distance - settings.distance) * lerp_factor;
    settings.target = settings.target + (settings.target_focus - settings.target) * lerp_factor;

    if let Ok(mut transform) = camera_query.single_mut() {
        transform.translation = settings.target + orbit_offset(settings.azimuth, settings.elevation, settings.distance);
        transform.look_at(settings.target, Vec3::Y);
    }
}
