//! Interactive 3D globe with place markers using Bevy.
//!
//! A textured planet carries pin-shaped markers for a fixed set of cities
//! plus every place served by the places API. The camera orbits the globe,
//! and the marker under the pointer is picked every frame. Nothing renders
//! until the planet texture has settled.

pub mod async_runtime;
pub mod camera;
pub mod constants;
pub mod geo;
pub mod globe;
pub mod ingest;
pub mod load_gate;
pub mod marker;
pub mod picking;
pub mod scene;
pub mod ui;

use bevy::prelude::*;

use camera::OrbitCameraPlugin;
use ingest::PlacesIngestPlugin;
use load_gate::LoadGatePlugin;
use marker::MarkerPlugin;
use picking::MarkerPickingPlugin;
use scene::GlobeScenePlugin;
use ui::DebugUiPlugin;

/// Plugin for the whole application, minus the window and async runtime.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            LoadGatePlugin,
            MarkerPlugin,
            GlobeScenePlugin,
            OrbitCameraPlugin,
            MarkerPickingPlugin,
            PlacesIngestPlugin,
            DebugUiPlugin,
        ));
    }
}
