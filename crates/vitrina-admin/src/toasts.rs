//! On-screen notifications

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use vitrina_core::{Notification, NotificationDurations, NotificationLevel};
use vitrina_scene::{Presets, SceneNotifications};

pub struct ToastPlugin;

impl Plugin for ToastPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Toasts>()
            .init_resource::<Durations>()
            .add_systems(PostUpdate, collect_notifications)
            .add_systems(EguiPrimaryContextPass, show_toasts);
    }
}

/// Per-level display durations from the config
#[derive(Resource, Default, Deref)]
pub struct Durations(pub NotificationDurations);

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub notification: Notification,
    pub remaining_ms: f32,
}

/// Notifications currently on screen, oldest first
#[derive(Resource, Default)]
pub struct Toasts {
    pub active: Vec<Toast>,
}

impl Toasts {
    pub fn push(&mut self, notification: Notification, durations: &NotificationDurations) {
        let remaining_ms = durations.for_notification(&notification) as f32;
        self.active.push(Toast {
            notification,
            remaining_ms,
        });
    }

    /// Advance time and drop expired toasts
    pub fn tick(&mut self, elapsed_ms: f32) {
        for toast in &mut self.active {
            toast.remaining_ms -= elapsed_ms;
        }
        self.active.retain(|toast| toast.remaining_ms > 0.0);
    }
}

/// Move notifications raised this frame onto the screen
fn collect_notifications(
    mut presets: ResMut<Presets>,
    mut scene: ResMut<SceneNotifications>,
    mut toasts: ResMut<Toasts>,
    durations: Res<Durations>,
    time: Res<Time>,
) {
    toasts.tick(time.delta_secs() * 1000.0);
    for notification in presets.take_notifications().into_iter().chain(scene.0.drain(..)) {
        toasts.push(notification, &durations);
    }
}

fn level_color(level: NotificationLevel) -> egui::Color32 {
    match level {
        NotificationLevel::Success => egui::Color32::from_rgb(46, 160, 67),
        NotificationLevel::Info => egui::Color32::from_rgb(56, 132, 244),
        NotificationLevel::Warning => egui::Color32::from_rgb(214, 158, 46),
        NotificationLevel::Error => egui::Color32::from_rgb(220, 53, 69),
    }
}

fn show_toasts(mut contexts: EguiContexts, toasts: Res<Toasts>) {
    if toasts.active.is_empty() {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else { return };

    egui::Area::new(egui::Id::new("toasts"))
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
        .interactable(false)
        .show(ctx, |ui| {
            for toast in &toasts.active {
                egui::Frame::new()
                    .fill(level_color(toast.notification.level))
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(12, 8))
                    .show(ui, |ui| {
                        ui.colored_label(egui::Color32::WHITE, &toast.notification.message);
                    });
                ui.add_space(6.0);
            }
        });
}
