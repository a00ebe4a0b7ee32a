//! Pin-shaped place markers.
//!
//! A marker is a root entity with two children: a thin cone (the shaft) whose
//! tip sits at the marker origin, and a small sphere (the head) on top of it.
//! Both parts of every marker draw with the same material handle, so editing
//! that one material recolors all markers at once.

use bevy::prelude::*;
use places::GeoCoordinate;

use crate::constants::{
    MARKER_COLOR, MARKER_HEAD_RADIUS, MARKER_HEAD_SECTORS, MARKER_HEAD_STACKS,
    MARKER_SHAFT_HEIGHT, MARKER_SHAFT_RADIUS, MARKER_SHAFT_RESOLUTION,
};
use crate::geo::SurfacePlacement;
use crate::picking::{HitVolume, Pickable};

/// Plugin that creates the shared marker assets.
pub struct MarkerPlugin;

impl Plugin for MarkerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MarkerAssets>();
    }
}

/// Root of a marker.
#[derive(Component, Debug, Clone, Copy)]
pub struct Marker {
    /// Where the marker stands.
    pub coordinate: GeoCoordinate,
    /// Creation order on its globe.
    pub index: usize,
}

/// The cone part of a marker.
#[derive(Component)]
pub struct MarkerShaft;

/// The sphere part of a marker; the pickable one.
#[derive(Component)]
pub struct MarkerHead;

/// Meshes and the material shared by every marker.
#[derive(Resource, Clone)]
pub struct MarkerAssets {
    pub shaft: Handle<Mesh>,
    pub head: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

impl MarkerAssets {
    pub fn new(meshes: &mut Assets<Mesh>, materials: &mut Assets<StandardMaterial>) -> Self {
        let shaft = Cone::new(MARKER_SHAFT_RADIUS, MARKER_SHAFT_HEIGHT)
            .mesh()
            .resolution(MARKER_SHAFT_RESOLUTION);
        let head = Sphere::new(MARKER_HEAD_RADIUS)
            .mesh()
            .uv(MARKER_HEAD_SECTORS, MARKER_HEAD_STACKS);

        let [r, g, b] = MARKER_COLOR;
        Self {
            shaft: meshes.add(shaft),
            head: meshes.add(head),
            material: materials.add(StandardMaterial {
                base_color: Color::srgb_u8(r, g, b),
                ..default()
            }),
        }
    }
}

impl FromWorld for MarkerAssets {
    fn from_world(world: &mut World) -> Self {
        world.resource_scope(|world, mut meshes: Mut<Assets<Mesh>>| {
            let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
            Self::new(&mut meshes, &mut materials)
        })
    }
}

/// Local transform of the shaft: flipped so the tip is at the origin and the
/// base at `MARKER_SHAFT_HEIGHT` along +Y.
fn shaft_transform() -> Transform {
    Transform::from_xyz(0.0, MARKER_SHAFT_HEIGHT * 0.5, 0.0)
        .with_rotation(Quat::from_rotation_x(std::f32::consts::PI))
}

/// Height of the head's center above the marker origin.
#[must_use]
pub fn head_height() -> f32 {
    MARKER_SHAFT_HEIGHT * 0.95 + MARKER_HEAD_RADIUS
}

/// Display name of a marker.
#[must_use]
pub fn marker_label(index: usize, coordinate: GeoCoordinate) -> String {
    format!(
        "Marker #{index} ({:.4}, {:.4})",
        coordinate.latitude, coordinate.longitude
    )
}

/// Spawn a marker at the origin with identity rotation.
///
/// The caller positions it afterwards with [`apply_placement`]. The head's
/// hit callback logs the marker's label at debug level.
pub fn spawn_marker(
    commands: &mut Commands,
    assets: &MarkerAssets,
    coordinate: GeoCoordinate,
    index: usize,
) -> Entity {
    let label = marker_label(index, coordinate);

    let marker = commands
        .spawn((
            Name::new(label.clone()),
            Marker { coordinate, index },
            Transform::IDENTITY,
            Visibility::default(),
        ))
        .id();

    commands.spawn((
        Name::new("Marker shaft"),
        MarkerShaft,
        Mesh3d(assets.shaft.clone()),
        MeshMaterial3d(assets.material.clone()),
        shaft_transform(),
        HitVolume::sphere(MARKER_SHAFT_HEIGHT * 0.5),
        ChildOf(marker),
    ));

    let hit_label = label.clone();
    commands.spawn((
        Name::new("Marker head"),
        MarkerHead,
        Mesh3d(assets.head.clone()),
        MeshMaterial3d(assets.material.clone()),
        Transform::from_xyz(0.0, head_height(), 0.0),
        HitVolume::sphere(MARKER_HEAD_RADIUS),
        Pickable::new(label, move |hit| {
            tracing::debug!(marker = %hit_label, distance = hit.distance, "marker hit");
        }),
        ChildOf(marker),
    ));

    marker
}

/// Move a freshly spawned marker to its place on the globe.
pub fn apply_placement(commands: &mut Commands, marker: Entity, placement: SurfacePlacement) {
    commands.entity(marker).insert(placement.to_transform());
}
