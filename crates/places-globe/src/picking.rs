//! Pointer picking against the scene.
//!
//! Every frame the latest pointer sample is turned into a ray from the
//! camera. The ray is tested against every visible entity that has a
//! [`HitVolume`] (planet, marker shafts, marker heads), the hits are sorted
//! nearest first, and the callback of each hit that carries the
//! [`Pickable`] capability is invoked in that order. Hits without the
//! capability are skipped.
//!
//! Pointer motion only records the sample; picking happens on the frame
//! cadence and only once the render loop is running.

use std::sync::Arc;

use bevy::camera::CameraProjection;
use bevy::ecs::message::MessageReader;
use bevy::math::bounding::{BoundingSphere, RayCast3d};
use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved};

use crate::camera::OrbitCamera;
use crate::load_gate::LoadState;

/// Plugin for pointer tracking and per-frame picking.
pub struct MarkerPickingPlugin;

impl Plugin for MarkerPickingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>()
            .init_resource::<HoveredMarker>()
            .add_systems(
                Update,
                (
                    track_pointer,
                    pick_under_pointer.run_if(in_state(LoadState::Running)),
                )
                    .chain(),
            );
    }
}

/// Last pointer position in normalized device coordinates.
///
/// `None` until the pointer first moves over the window, and again after it
/// leaves. Later samples overwrite earlier ones.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct PointerState {
    pub ndc: Option<Vec2>,
}

/// Nearest pickable hit of the last picking pass.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct HoveredMarker(pub Option<PickHit>);

/// Bounding sphere used for ray hit tests, in the entity's local space.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HitVolume {
    pub center: Vec3,
    pub radius: f32,
}

impl HitVolume {
    /// A sphere centered on the entity's origin.
    #[must_use]
    pub fn sphere(radius: f32) -> Self {
        Self {
            center: Vec3::ZERO,
            radius,
        }
    }

    /// The volume in world space for an entity with `transform`.
    #[must_use]
    pub fn to_world(&self, transform: &GlobalTransform) -> BoundingSphere {
        let center = transform.transform_point(self.center);
        let scale = transform.scale().abs().max_element();
        BoundingSphere::new(center, self.radius * scale)
    }
}

/// One ray intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub entity: Entity,
    /// Distance from the ray origin to the first intersection.
    pub distance: f32,
}

/// Intersections sorted by ascending distance.
pub type PickResult = Vec<PickHit>;

type HitCallback = Arc<dyn Fn(&PickHit) + Send + Sync>;

/// Capability of reacting to being picked.
///
/// Only entities with this component have their hits dispatched.
#[derive(Component, Clone)]
pub struct Pickable {
    label: String,
    on_hit: HitCallback,
}

impl Pickable {
    /// Create a pickable with a label (shown in the UI) and a hit callback.
    pub fn new(label: impl Into<String>, on_hit: impl Fn(&PickHit) + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            on_hit: Arc::new(on_hit),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Invoke the hit callback.
    pub fn hit(&self, hit: &PickHit) {
        (self.on_hit)(hit);
    }
}

impl std::fmt::Debug for Pickable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pickable")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Convert a window position in logical pixels to normalized device
/// coordinates: `[-1, 1]` on both axes, origin at the viewport center, y up.
#[must_use]
pub fn pointer_to_ndc(position: Vec2, viewport_size: Vec2) -> Vec2 {
    Vec2::new(
        position.x / viewport_size.x * 2.0 - 1.0,
        -(position.y / viewport_size.y) * 2.0 + 1.0,
    )
}

/// Build a ray from a perspective camera through `ndc`.
///
/// The ray starts at the camera position and passes through the point at
/// NDC depth 0.5, which lies in front of the camera for both regular and
/// reversed-Z projections. Returns `None` for degenerate matrices.
#[must_use]
pub fn ray_from_ndc(ndc: Vec2, clip_from_view: Mat4, world_from_view: Mat4) -> Option<Ray3d> {
    let target_view = clip_from_view
        .inverse()
        .project_point3(Vec3::new(ndc.x, ndc.y, 0.5));

    let origin = world_from_view.transform_point3(Vec3::ZERO);
    let target = world_from_view.transform_point3(target_view);

    let direction = Dir3::new(target - origin).ok()?;
    Some(Ray3d::new(origin, direction))
}

/// Intersect a ray with world-space bounding spheres.
pub fn pick(ray: Ray3d, candidates: impl IntoIterator<Item = (Entity, BoundingSphere)>) -> PickResult {
    let cast = RayCast3d::from_ray(ray, f32::MAX);

    let mut hits: PickResult = candidates
        .into_iter()
        .filter_map(|(entity, sphere)| {
            cast.sphere_intersection_at(&sphere)
                .map(|distance| PickHit { entity, distance })
        })
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Invoke the callbacks of the pickable hits, nearest first.
///
/// Hits whose entity has no [`Pickable`] are skipped. Returns the hits that
/// were dispatched.
pub fn dispatch<'a>(
    result: &[PickHit],
    pickable: impl Fn(Entity) -> Option<&'a Pickable>,
) -> Vec<PickHit> {
    result
        .iter()
        .filter_map(|hit| {
            let target = pickable(hit.entity)?;
            target.hit(hit);
            Some(*hit)
        })
        .collect()
}

type HitVolumeQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static HitVolume,
        &'static GlobalTransform,
        &'static InheritedVisibility,
    ),
>;

/// Pick every visible hit volume in the scene.
fn pick_scene(ray: Ray3d, volumes: &HitVolumeQuery) -> PickResult {
    pick(
        ray,
        volumes
            .iter()
            .filter(|(_, _, _, visibility)| visibility.get())
            .map(|(entity, volume, transform, _)| (entity, volume.to_world(transform))),
    )
}

/// Record the latest pointer position.
fn track_pointer(
    mut moved: MessageReader<CursorMoved>,
    mut left: MessageReader<CursorLeft>,
    windows: Query<&Window>,
    mut pointer: ResMut<PointerState>,
) {
    for event in moved.read() {
        let Ok(window) = windows.get(event.window) else {
            continue;
        };
        let size = Vec2::new(window.width(), window.height());
        if size.min_element() <= 0.0 {
            continue;
        }
        pointer.ndc = Some(pointer_to_ndc(event.position, size));
    }

    if left.read().count() > 0 {
        pointer.ndc = None;
    }
}

/// Cast the pointer ray and dispatch hits to pickables.
///
/// Every pickable hit gets its callback. The hover record only takes the
/// nearest hit, and only if it is pickable: a marker behind the planet is
/// not hovered.
#[allow(clippy::needless_pass_by_value)]
fn pick_under_pointer(
    pointer: Res<PointerState>,
    mut hovered: ResMut<HoveredMarker>,
    camera: Single<(&Projection, &GlobalTransform), With<OrbitCamera>>,
    volumes: HitVolumeQuery,
    pickables: Query<&Pickable>,
) {
    let Some(ndc) = pointer.ndc else {
        hovered.0 = None;
        return;
    };

    let (projection, camera_transform) = *camera;
    let world_from_view = Mat4::from(camera_transform.affine());
    let Some(ray) = ray_from_ndc(ndc, projection.get_clip_from_view(), world_from_view) else {
        return;
    };

    let result = pick_scene(ray, &volumes);
    dispatch(&result, |entity| pickables.get(entity).ok());

    let nearest = result
        .first()
        .copied()
        .filter(|hit| pickables.contains(hit.entity));
    if nearest.map(|hit| hit.entity) != hovered.0.map(|hit| hit.entity)
        && let Some(target) = nearest.and_then(|hit| pickables.get(hit.entity).ok())
    {
        tracing::info!(marker = target.label(), "hovering marker");
    }
    hovered.0 = nearest;
}
