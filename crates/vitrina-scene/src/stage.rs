//! Camera, lights and background

use bevy::prelude::*;

use crate::camera::{orbit_offset, CameraSettings, MainCamera};

/// Light grey backdrop behind the model
pub const BACKGROUND: Color = Color::srgb(0.941, 0.941, 0.941);

/// Plugin for scene setup
pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(BACKGROUND))
            .add_systems(Startup, setup_stage);
    }
}

fn setup_stage(mut commands: Commands, settings: Res<CameraSettings>) {
    let eye = settings.target + orbit_offset(settings.azimuth, settings.elevation, settings.distance);
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: 0.01,
            far: 1000.0,
            ..default()
        }),
        Transform::from_translation(eye).looking_at(settings.target, Vec3::Y),
        MainCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 6000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 7.5).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Soft fill from the opposite side
    commands.spawn((
        PointLight {
            intensity: 200000.0,
            shadows_enabled: false,
            color: Color::srgb(1.0, 0.97, 0.92),
            ..default()
        },
        Transform::from_xyz(-6.0, 4.0, -6.0),
    ));
}
