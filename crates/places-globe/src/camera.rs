//! Orbit camera around the globe.
//!
//! The camera sits on a sphere around the origin, described by yaw, pitch
//! and distance, and always looks at the globe's center. It slowly circles
//! on its own; left-drag rotates and the wheel zooms. There is no panning.
//! The camera stays inactive until the load gate reaches `Running`.

use std::f32::consts::{FRAC_PI_2, TAU};

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::load_gate::LoadState;

/// Closest the camera may get to the globe center.
pub const MIN_DISTANCE: f32 = 1.2;
/// Farthest the camera may get from the globe center.
pub const MAX_DISTANCE: f32 = 10.0;
/// Pitch stays this far short of the poles so `looking_at` keeps a valid up.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
/// Distance factor per wheel line.
const ZOOM_STEP: f32 = 0.95;

/// Plugin for the orbit camera.
pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(LoadState::Running), activate_camera)
            .add_systems(
                Update,
                (orbit_input, auto_rotate, apply_orbit)
                    .chain()
                    .run_if(in_state(LoadState::Running)),
            );
    }
}

/// Orbit parameters of the scene camera.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Angle around the Y axis, from +X towards +Z, in radians.
    pub yaw: f32,
    /// Elevation above the equatorial plane, in radians.
    pub pitch: f32,
    /// Distance from the globe center.
    pub distance: f32,
    /// Revolutions per minute; negative turns the other way.
    pub auto_rotate_speed: f32,
}

impl OrbitCamera {
    /// Orbit parameters for a camera at `position` looking at the origin.
    #[must_use]
    pub fn from_position(position: Vec3, auto_rotate_speed: f32) -> Self {
        let distance = position.length().max(f32::EPSILON);
        Self {
            yaw: position.z.atan2(position.x),
            pitch: (position.y / distance).clamp(-1.0, 1.0).asin(),
            distance,
            auto_rotate_speed,
        }
    }

    #[must_use]
    pub fn eye(&self) -> Vec3 {
        orbit_eye(self.yaw, self.pitch, self.distance)
    }

    /// Camera transform for the current orbit.
    #[must_use]
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(Vec3::ZERO, Vec3::Y)
    }

    /// Advance the automatic rotation by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.yaw = (self.yaw + TAU / 60.0 * self.auto_rotate_speed * dt).rem_euclid(TAU);
    }

    /// Rotate by the given angles; pitch is clamped short of the poles.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(TAU);
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Zoom by `lines` wheel steps; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        self.distance = (self.distance * ZOOM_STEP.powf(lines)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

/// Position on the orbit sphere for the given angles.
#[must_use]
pub fn orbit_eye(yaw: f32, pitch: f32, distance: f32) -> Vec3 {
    Vec3::new(
        distance * yaw.cos() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.sin() * pitch.cos(),
    )
}

/// Turn the camera on once the first frame can render.
fn activate_camera(mut cameras: Query<&mut Camera, With<OrbitCamera>>) {
    for mut camera in &mut cameras {
        camera.is_active = true;
    }
    tracing::debug!("orbit camera active");
}

/// Left-drag rotates, the wheel zooms.
#[allow(clippy::needless_pass_by_value)]
fn orbit_input(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: MessageReader<MouseMotion>,
    mut wheel: MessageReader<MouseWheel>,
    window: Single<&Window, With<PrimaryWindow>>,
    mut contexts: EguiContexts,
    mut orbit: Single<&mut OrbitCamera>,
) {
    let drag: Vec2 = motion.read().map(|event| event.delta).sum();
    let scroll: f32 = wheel
        .read()
        .map(|event| match event.unit {
            // Web reports pixels, native reports lines.
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 120.0,
        })
        .sum();

    let over_ui = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.is_pointer_over_area());
    if over_ui {
        return;
    }

    if mouse.pressed(MouseButton::Left) && drag != Vec2::ZERO {
        // A drag across the full window height is one full turn.
        let height = window.height().max(1.0);
        orbit.rotate(TAU * drag.x / height, TAU * drag.y / height);
    }

    if scroll != 0.0 {
        orbit.zoom(scroll);
    }
}

/// Keep circling unless the user is dragging.
#[allow(clippy::needless_pass_by_value)]
fn auto_rotate(
    time: Res<Time>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut orbit: Single<&mut OrbitCamera>,
) {
    if orbit.auto_rotate_speed == 0.0 || mouse.pressed(MouseButton::Left) {
        return;
    }
    orbit.advance(time.delta_secs());
}

fn apply_orbit(mut cameras: Query<(&OrbitCamera, &mut Transform), Changed<OrbitCamera>>) {
    for (orbit, mut transform) in &mut cameras {
        *transform = orbit.transform();
    }
}
