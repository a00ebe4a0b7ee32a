//! Compiled-in scene parameters.

use places::GeoCoordinate;

/// Radius of the globe in world units.
pub const GLOBE_RADIUS: f32 = 1.0;

/// Planet texture, relative to the asset directory.
pub const GLOBE_TEXTURE_PATH: &str = "earth.jpg";

/// UV sphere resolution of the planet mesh.
pub const GLOBE_SECTORS: u32 = 64;
pub const GLOBE_STACKS: u32 = 48;

/// Marker shaft: base radius and height of the cone.
pub const MARKER_SHAFT_RADIUS: f32 = 0.005;
pub const MARKER_SHAFT_HEIGHT: f32 = 0.05;
pub const MARKER_SHAFT_RESOLUTION: u32 = 8;

/// Marker head sphere.
pub const MARKER_HEAD_RADIUS: f32 = 0.02;
pub const MARKER_HEAD_SECTORS: u32 = 16;
pub const MARKER_HEAD_STACKS: u32 = 8;

/// Shared marker color (`#bab68f`).
pub const MARKER_COLOR: [u8; 3] = [0xba, 0xb6, 0x8f];

/// Vertical field of view in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 100.0;

/// Initial camera position, looking at the globe center.
pub const CAMERA_START: [f32; 3] = [0.0, 1.5, 3.0];

/// Auto-rotate speed; 1.0 is one revolution per minute, negative is clockwise
/// seen from above.
pub const CAMERA_AUTO_ROTATE_SPEED: f32 = -1.0;

/// Ambient and directional light intensity, as a fraction of full white.
pub const LIGHT_INTENSITY: f32 = 0.5;

/// Direction the directional light shines from.
pub const LIGHT_POSITION: [f32; 3] = [5.0, 2.0, 5.0];

/// Places API endpoint.
pub const PLACES_URL: &str = "http://localhost:3000/api/v1/places.json";

/// Markers that are always on the globe, independent of the places API.
pub const SEED_CITIES: [(&str, GeoCoordinate); 15] = [
    ("Paris", GeoCoordinate::new(48.8567, 2.3508)),
    ("London", GeoCoordinate::new(51.507_222, -0.1275)),
    ("Los Angeles", GeoCoordinate::new(34.05, -118.25)),
    ("Chicago", GeoCoordinate::new(41.836_944, -87.684_722)),
    ("Tokyo", GeoCoordinate::new(35.683_333, 139.683_333)),
    ("Baghdad", GeoCoordinate::new(33.333_333, 44.383_333)),
    ("New York", GeoCoordinate::new(40.7127, -74.0059)),
    ("Moscow", GeoCoordinate::new(55.75, 37.616_667)),
    ("Memphis", GeoCoordinate::new(35.1175, -89.971_111)),
    ("Cape Town", GeoCoordinate::new(-33.925_278, 18.423_889)),
    ("Dallas", GeoCoordinate::new(32.775_833, -96.796_667)),
    ("Amsterdam", GeoCoordinate::new(52.366_667, 4.9)),
    ("Boston", GeoCoordinate::new(42.358_056, -71.063_611)),
    ("Berlin", GeoCoordinate::new(52.507_222, 13.145_833)),
    ("San Francisco", GeoCoordinate::new(37.783_333, -122.416_667)),
];
