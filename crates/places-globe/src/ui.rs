//! Debug overlay: frame rate, startup progress, markers and the hovered one.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};

use crate::globe::Globe;
use crate::ingest::{FeedStatus, PlacesFeed};
use crate::load_gate::{LoadState, RequiredAssets};
use crate::picking::{HoveredMarker, Pickable};

/// Plugin for the debug overlay.
pub struct DebugUiPlugin;

impl Plugin for DebugUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_plugins(FrameTimeDiagnosticsPlugin::default())
            .add_systems(EguiPrimaryContextPass, debug_ui_system);
    }
}

fn feed_label(status: &FeedStatus) -> String {
    match status {
        FeedStatus::Idle => "idle".to_string(),
        FeedStatus::Fetching => "fetching".to_string(),
        FeedStatus::Applied { added, rejected } => {
            format!("{added} added, {rejected} skipped")
        }
        FeedStatus::Failed(reason) => format!("failed: {reason}"),
    }
}

#[allow(clippy::needless_pass_by_value)]
fn debug_ui_system(
    mut contexts: EguiContexts,
    diagnostics: Res<DiagnosticsStore>,
    state: Res<State<LoadState>>,
    required: Res<RequiredAssets>,
    feed: Res<PlacesFeed>,
    hovered: Res<HoveredMarker>,
    globes: Query<&Globe>,
    pickables: Query<&Pickable>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(bevy::diagnostic::Diagnostic::smoothed)
        .unwrap_or(0.0);

    let (settled, total) = required.progress();
    let marker_count: usize = globes.iter().map(|globe| globe.markers().len()).sum();
    let hovered_label = hovered
        .0
        .and_then(|hit| pickables.get(hit.entity).ok())
        .map_or("none", Pickable::label);

    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {fps:.0}"));
            ui.label(format!("State: {:?}", state.get()));
            ui.label(format!("Assets: {settled}/{total}"));
            ui.label(format!("Markers: {marker_count}"));
            ui.label(format!("Places: {}", feed_label(feed.status())));
            ui.label(format!("Hovered: {hovered_label}"));
            ui.separator();
            ui.label("Controls:");
            ui.label("  Left drag - Rotate");
            ui.label("  Wheel - Zoom");
        });

    Ok(())
}
