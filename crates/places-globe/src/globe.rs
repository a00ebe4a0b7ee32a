//! The planet and the markers standing on it.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use places::GeoCoordinate;

use crate::constants::{GLOBE_SECTORS, GLOBE_STACKS, SEED_CITIES};
use crate::geo;
use crate::marker::{MarkerAssets, apply_placement, spawn_marker};
use crate::picking::HitVolume;

/// Root of the globe: the planet mesh plus every marker, as children.
#[derive(Component, Debug)]
pub struct Globe {
    radius: f32,
    markers: Vec<Entity>,
}

impl Globe {
    #[must_use]
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            markers: Vec::new(),
        }
    }

    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Marker entities in creation order.
    #[must_use]
    pub fn markers(&self) -> &[Entity] {
        &self.markers
    }
}

/// The textured planet sphere.
#[derive(Component)]
pub struct Planet;

/// Spawn the globe with its planet mesh.
///
/// `texture` may still be loading; the material picks it up once it is ready.
pub fn spawn_globe(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    radius: f32,
    texture: Handle<Image>,
) -> Entity {
    let globe = commands
        .spawn((
            Name::new("Globe"),
            Globe::new(radius),
            Transform::IDENTITY,
            Visibility::default(),
        ))
        .id();

    commands.spawn((
        Name::new("Planet"),
        Planet,
        Mesh3d(meshes.add(Sphere::new(radius).mesh().uv(GLOBE_SECTORS, GLOBE_STACKS))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color_texture: Some(texture),
            ..default()
        })),
        Transform::IDENTITY,
        HitVolume::sphere(radius),
        ChildOf(globe),
    ));

    globe
}

/// System parameter for adding markers to the globe.
#[derive(SystemParam)]
pub struct GlobeWriter<'w, 's> {
    commands: Commands<'w, 's>,
    globes: Query<'w, 's, (Entity, &'static mut Globe)>,
    assets: Res<'w, MarkerAssets>,
}

impl GlobeWriter<'_, '_> {
    /// Whether a globe exists to receive markers.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.globes.single().is_ok()
    }

    /// Add a marker at the given latitude and longitude (degrees).
    ///
    /// The marker is placed with the globe's own radius and appended after
    /// all existing markers. Coordinates are neither range- nor
    /// duplicate-checked. Returns `None` if there is no globe.
    pub fn add_marker_at(&mut self, lat: f64, lon: f64) -> Option<Entity> {
        let Ok((globe_entity, mut globe)) = self.globes.single_mut() else {
            tracing::warn!(lat, lon, "no globe to add a marker to");
            return None;
        };

        let coordinate = GeoCoordinate::new(lat, lon);
        let index = globe.markers.len();

        let marker = spawn_marker(&mut self.commands, &self.assets, coordinate, index);
        apply_placement(
            &mut self.commands,
            marker,
            geo::project(coordinate, globe.radius),
        );
        self.commands.entity(marker).insert(ChildOf(globe_entity));

        globe.markers.push(marker);
        Some(marker)
    }
}

/// Add the compiled-in city markers. Returns how many were added.
pub fn add_seed_cities(globe: &mut GlobeWriter) -> usize {
    let mut added = 0;
    for (name, coordinate) in SEED_CITIES {
        if globe
            .add_marker_at(coordinate.latitude, coordinate.longitude)
            .is_some()
        {
            tracing::debug!(city = name, "seeded marker");
            added += 1;
        }
    }
    added
}

pub fn seed_markers(mut globe: GlobeWriter) {
    let added = add_seed_cities(&mut globe);
    tracing::info!(added, cities = SEED_CITIES.len(), "seeded city markers");
}

#[cfg(test)]
pub(crate) mod tests {
    use bevy::ecs::system::RunSystemOnce;

    use super::*;
    use crate::marker::{Marker, MarkerHead};
    use crate::picking::{self, Pickable};

    /// A world with marker assets and an empty globe of radius 1.
    pub(crate) fn globe_world() -> (World, Entity) {
        let mut world = World::new();
        let mut meshes = Assets::<Mesh>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        world.insert_resource(MarkerAssets::new(&mut meshes, &mut materials));
        world.insert_resource(meshes);
        world.insert_resource(materials);

        let globe = world.spawn(Globe::new(1.0)).id();
        (world, globe)
    }

    pub(crate) fn globe_markers(world: &World, globe: Entity) -> Vec<Entity> {
        world.get::<Globe>(globe).unwrap().markers().to_vec()
    }

    #[test]
    fn test_add_marker_n_times() {
        let (mut world, globe) = globe_world();

        world
            .run_system_once(|mut writer: GlobeWriter| {
                for i in 0..5 {
                    writer.add_marker_at(f64::from(i) * 10.0, f64::from(i) * -20.0);
                }
            })
            .unwrap();

        let markers = globe_markers(&world, globe);
        assert_eq!(markers.len(), 5);

        for (index, &marker) in markers.iter().enumerate() {
            assert_eq!(world.get::<Marker>(marker).unwrap().index, index);
            assert_eq!(world.get::<ChildOf>(marker).unwrap().parent(), globe);
        }
    }

    #[test]
    fn test_marker_placement_follows_projection() {
        let (mut world, globe) = globe_world();
        world.get_mut::<Globe>(globe).unwrap().radius = 2.0;

        let marker = world
            .run_system_once(|mut writer: GlobeWriter| writer.add_marker_at(35.683_333, 139.683_333))
            .unwrap()
            .unwrap();

        let expected = geo::project(GeoCoordinate::new(35.683_333, 139.683_333), 2.0);
        let transform = world.get::<Transform>(marker).unwrap();
        assert_eq!(transform.translation, expected.translation);
        assert_eq!(transform.rotation, expected.rotation);
        assert!((transform.translation.length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_duplicate_coordinates_overlap() {
        let (mut world, globe) = globe_world();

        world
            .run_system_once(|mut writer: GlobeWriter| {
                writer.add_marker_at(40.7127, -74.0059);
                writer.add_marker_at(40.7127, -74.0059);
            })
            .unwrap();

        let markers = globe_markers(&world, globe);
        assert_eq!(markers.len(), 2);
        assert_ne!(markers[0], markers[1]);
        assert_eq!(
            world.get::<Transform>(markers[0]).unwrap(),
            world.get::<Transform>(markers[1]).unwrap()
        );
    }

    #[test]
    fn test_adding_is_append_only() {
        let (mut world, globe) = globe_world();

        world
            .run_system_once(|mut writer: GlobeWriter| {
                writer.add_marker_at(1.0, 1.0);
                writer.add_marker_at(2.0, 2.0);
            })
            .unwrap();
        let before = globe_markers(&world, globe);

        world
            .run_system_once(|mut writer: GlobeWriter| {
                writer.add_marker_at(3.0, 3.0);
            })
            .unwrap();
        let after = globe_markers(&world, globe);

        assert_eq!(after.len(), 3);
        assert_eq!(&after[..2], &before[..]);
    }

    #[test]
    fn test_no_globe_returns_none() {
        let (mut world, globe) = globe_world();
        world.despawn(globe);

        let (ready, marker) = world
            .run_system_once(|mut writer: GlobeWriter| {
                (writer.is_ready(), writer.add_marker_at(0.0, 0.0))
            })
            .unwrap();

        assert!(!ready);
        assert!(marker.is_none());
        assert_eq!(world.query::<&Marker>().iter(&world).count(), 0);
    }

    #[test]
    fn test_seed_markers() {
        let (mut world, globe) = globe_world();

        let added = world
            .run_system_once(|mut writer: GlobeWriter| add_seed_cities(&mut writer))
            .unwrap();

        assert_eq!(added, SEED_CITIES.len());
        assert_eq!(globe_markers(&world, globe).len(), SEED_CITIES.len());
    }

    #[test]
    fn test_seed_without_globe_adds_nothing() {
        let (mut world, globe) = globe_world();
        world.despawn(globe);

        let added = world
            .run_system_once(|mut writer: GlobeWriter| add_seed_cities(&mut writer))
            .unwrap();

        assert_eq!(added, 0);
        assert_eq!(world.query::<&Marker>().iter(&world).count(), 0);
    }

    #[test]
    fn test_ray_through_marker_head_picks_that_marker_first() {
        let (mut world, _) = globe_world();

        let marker = world
            .run_system_once(|mut writer: GlobeWriter| writer.add_marker_at(0.0, 0.0))
            .unwrap()
            .unwrap();

        // Compose local transforms up the hierarchy; there is no transform
        // propagation in a bare world.
        let mut candidates = Vec::new();
        let mut query = world.query::<(Entity, &HitVolume, &Transform, Option<&ChildOf>)>();
        for (entity, volume, transform, parent) in query.iter(&world) {
            let mut global = *transform;
            let mut current = parent.map(ChildOf::parent);
            while let Some(ancestor) = current {
                if let Some(parent_transform) = world.get::<Transform>(ancestor) {
                    global = parent_transform.mul_transform(global);
                }
                current = world.get::<ChildOf>(ancestor).map(ChildOf::parent);
            }
            candidates.push((entity, volume.to_world(&GlobalTransform::from(global))));
        }
        // The planet itself.
        let planet = world.spawn(HitVolume::sphere(1.0)).id();
        candidates.push((planet, HitVolume::sphere(1.0).to_world(&GlobalTransform::IDENTITY)));

        // A marker at (0, 0) stands on +X. Aim along -Z through its head,
        // outside the planet and beside the shaft.
        let head_center = Vec3::X * (1.0 + crate::marker::head_height());
        let ray = Ray3d::new(head_center + Vec3::Z * 3.0, Dir3::NEG_Z);
        let result = picking::pick(ray, candidates);

        assert_eq!(result.len(), 1);
        let first = result[0];
        assert!(world.get::<MarkerHead>(first.entity).is_some());
        assert!(world.get::<Pickable>(first.entity).is_some());
        assert_eq!(world.get::<ChildOf>(first.entity).unwrap().parent(), marker);
        assert!((first.distance - (3.0 - crate::constants::MARKER_HEAD_RADIUS)).abs() < 1e-4);
    }
}
