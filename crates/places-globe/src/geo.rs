//! Geographic to scene-space projection.
//!
//! The globe uses Y as the polar axis and latitude measured from the
//! equatorial plane. Longitude is negated so that east runs towards -Z,
//! matching how the equirectangular planet texture wraps the UV sphere.

use std::f64::consts::FRAC_PI_2;

use bevy::prelude::*;
use glam::DVec3;
use places::GeoCoordinate;

/// Position and orientation of an object standing on the globe surface.
///
/// The rotation maps local +Y onto the outward surface normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePlacement {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl SurfacePlacement {
    /// The placement as a transform with unit scale.
    #[must_use]
    pub fn to_transform(self) -> Transform {
        Transform::from_translation(self.translation).with_rotation(self.rotation)
    }
}

/// Latitude and (texture-convention) longitude in radians.
fn to_radians(coordinate: GeoCoordinate) -> (f64, f64) {
    (
        coordinate.latitude.to_radians(),
        -coordinate.longitude.to_radians(),
    )
}

/// Convert latitude, longitude (degrees) and radius to scene coordinates.
///
/// Uses a spherical Earth approximation.
#[must_use]
pub fn lat_lon_to_position(coordinate: GeoCoordinate, radius: f64) -> DVec3 {
    let (lat_rad, lon_rad) = to_radians(coordinate);
    DVec3::new(
        lat_rad.cos() * lon_rad.cos() * radius,
        lat_rad.sin() * radius,
        lat_rad.cos() * lon_rad.sin() * radius,
    )
}

/// Place an object on a sphere of `radius` centered at the origin.
///
/// Inputs are not range-checked; out-of-range angles wrap around.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn project(coordinate: GeoCoordinate, radius: f32) -> SurfacePlacement {
    let (lat_rad, lon_rad) = to_radians(coordinate);
    let position = lat_lon_to_position(coordinate, f64::from(radius));

    // Euler (0, -lon, lat - pi/2) in intrinsic XYZ order: tilt +Y from the
    // pole down to the latitude, then swing it round to the meridian.
    let rotation =
        Quat::from_rotation_y(-lon_rad as f32) * Quat::from_rotation_z((lat_rad - FRAC_PI_2) as f32);

    SurfacePlacement {
        translation: position.as_vec3(),
        rotation,
    }
}
