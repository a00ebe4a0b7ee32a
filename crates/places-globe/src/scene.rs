//! Scene setup: globe, camera and lights.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::window::WindowResized;

use crate::camera::OrbitCamera;
use crate::constants::{
    CAMERA_AUTO_ROTATE_SPEED, CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, CAMERA_START,
    GLOBE_RADIUS, GLOBE_TEXTURE_PATH, LIGHT_INTENSITY, LIGHT_POSITION,
};
use crate::globe::{seed_markers, spawn_globe};
use crate::load_gate::RequiredAssets;

/// Illuminance of the directional light at full intensity, in lux.
const FULL_SUN_LUX: f32 = 10_000.0;
/// Ambient brightness at full intensity.
const FULL_AMBIENT_BRIGHTNESS: f32 = 1_000.0;

/// Plugin that builds the scene.
pub struct GlobeScenePlugin;

impl Plugin for GlobeScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(Color::BLACK))
            .add_systems(Startup, (setup_scene, seed_markers).chain())
            .add_systems(Update, log_viewport_resize);
    }
}

/// Spawn the globe, the camera and the lights.
///
/// The planet texture is registered with the load gate; the camera renders
/// nothing until the gate opens.
#[allow(clippy::needless_pass_by_value)]
fn setup_scene(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut required: ResMut<RequiredAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let texture: Handle<Image> = asset_server.load(GLOBE_TEXTURE_PATH);
    required.require(texture.id());

    spawn_globe(
        &mut commands,
        &mut meshes,
        &mut materials,
        GLOBE_RADIUS,
        texture,
    );

    let orbit = OrbitCamera::from_position(Vec3::from(CAMERA_START), CAMERA_AUTO_ROTATE_SPEED);
    commands.spawn((
        Name::new("Camera"),
        Camera3d::default(),
        Camera {
            is_active: false,
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        orbit.transform(),
        orbit,
        AmbientLight {
            color: Color::WHITE,
            brightness: FULL_AMBIENT_BRIGHTNESS * LIGHT_INTENSITY,
            ..default()
        },
    ));

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            color: Color::WHITE,
            illuminance: FULL_SUN_LUX * LIGHT_INTENSITY,
            ..default()
        },
        Transform::from_translation(Vec3::from(LIGHT_POSITION).normalize())
            .looking_at(Vec3::ZERO, Vec3::Y),
    ));

    tracing::info!(texture = GLOBE_TEXTURE_PATH, "scene setup complete");
}

/// Bevy keeps the surface and the projection's aspect ratio in sync with the
/// window; this only reports it.
fn log_viewport_resize(mut resized: MessageReader<WindowResized>) {
    if let Some(event) = resized.read().last() {
        tracing::debug!(width = event.width, height = event.height, "viewport resized");
    }
}
