//! Gate that holds back the render loop until required assets settle.
//!
//! `Idle → Loading → Ready → Running`. Scene setup registers the assets the
//! first frame depends on (the planet texture) and enters `Loading`. Once
//! every one of them has either loaded or failed, the gate opens: `Ready`,
//! then `Running`, which is terminal. A failed asset is logged and only
//! costs visual fidelity; it never blocks startup.
//!
//! Systems that make up the per-frame loop (camera orbit, picking) run only
//! in `Running`.

use std::collections::{HashMap, HashSet};

use bevy::asset::{AssetLoadFailedEvent, UntypedAssetId};
use bevy::ecs::message::{Message, MessageReader, MessageWriter};
use bevy::prelude::*;

/// Plugin for the load gate.
pub struct LoadGatePlugin;

impl Plugin for LoadGatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<LoadState>()
            .init_resource::<RequiredAssets>()
            .add_message::<AssetSettled>()
            .add_systems(Startup, begin_loading)
            .add_systems(
                Update,
                (
                    forward_image_events,
                    record_settled_assets,
                    open_gate.run_if(in_state(LoadState::Loading)),
                )
                    .chain(),
            )
            .add_systems(OnEnter(LoadState::Ready), start_render_loop);
    }
}

/// Startup phase of the application.
#[derive(States, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoadState {
    #[default]
    Idle,
    /// Waiting for required assets.
    Loading,
    /// Required assets settled; the render loop is about to start.
    Ready,
    /// Rendering every frame. Terminal.
    Running,
}

/// How a required asset finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOutcome {
    Loaded,
    Failed,
}

/// A required asset finished loading, successfully or not.
#[derive(Message, Debug, Clone, Copy)]
pub struct AssetSettled {
    pub id: UntypedAssetId,
    pub outcome: AssetOutcome,
}

/// Assets the first frame waits for.
#[derive(Resource, Default, Debug)]
pub struct RequiredAssets {
    pending: HashSet<UntypedAssetId>,
    settled: HashMap<UntypedAssetId, AssetOutcome>,
}

impl RequiredAssets {
    /// Make the first frame wait for `id`.
    pub fn require(&mut self, id: impl Into<UntypedAssetId>) {
        let id = id.into();
        if !self.settled.contains_key(&id) {
            self.pending.insert(id);
        }
    }

    #[must_use]
    pub fn is_required(&self, id: UntypedAssetId) -> bool {
        self.pending.contains(&id) || self.settled.contains_key(&id)
    }

    /// Mark `id` as settled. Returns `false` if it was not pending.
    pub fn settle(&mut self, id: UntypedAssetId, outcome: AssetOutcome) -> bool {
        if !self.pending.remove(&id) {
            return false;
        }
        self.settled.insert(id, outcome);
        true
    }

    /// Whether every required asset has settled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// `(settled, total)`.
    #[must_use]
    pub fn progress(&self) -> (usize, usize) {
        let settled = self.settled.len();
        (settled, settled + self.pending.len())
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.settled
            .values()
            .filter(|&&outcome| outcome == AssetOutcome::Failed)
            .count()
    }
}

fn begin_loading(mut next: ResMut<NextState<LoadState>>) {
    tracing::info!("waiting for required assets");
    next.set(LoadState::Loading);
}

/// Translate image load results into [`AssetSettled`] for required images.
#[allow(clippy::needless_pass_by_value)]
fn forward_image_events(
    mut events: MessageReader<AssetEvent<Image>>,
    mut failures: MessageReader<AssetLoadFailedEvent<Image>>,
    required: Res<RequiredAssets>,
    mut settled: MessageWriter<AssetSettled>,
) {
    for event in events.read() {
        if let AssetEvent::LoadedWithDependencies { id } = event
            && required.is_required(id.untyped())
        {
            settled.write(AssetSettled {
                id: id.untyped(),
                outcome: AssetOutcome::Loaded,
            });
        }
    }

    for failure in failures.read() {
        if required.is_required(failure.id.untyped()) {
            tracing::warn!(
                path = %failure.path,
                error = %failure.error,
                "required asset failed to load, continuing without it"
            );
            settled.write(AssetSettled {
                id: failure.id.untyped(),
                outcome: AssetOutcome::Failed,
            });
        }
    }
}

/// Apply settle notifications to [`RequiredAssets`].
///
/// Runs in every state so completions that race the `Loading` transition are
/// not lost; repeats and unknown ids are ignored.
fn record_settled_assets(
    mut events: MessageReader<AssetSettled>,
    mut required: ResMut<RequiredAssets>,
) {
    for event in events.read() {
        if required.settle(event.id, event.outcome) {
            let (settled, total) = required.progress();
            tracing::debug!(settled, total, outcome = ?event.outcome, "required asset settled");
        }
    }
}

/// Move to `Ready` once every required asset has settled.
#[allow(clippy::needless_pass_by_value)]
fn open_gate(required: Res<RequiredAssets>, mut next: ResMut<NextState<LoadState>>) {
    if required.is_complete() {
        next.set(LoadState::Ready);
    }
}

fn start_render_loop(required: Res<RequiredAssets>, mut next: ResMut<NextState<LoadState>>) {
    let (_, total) = required.progress();
    tracing::info!(
        assets = total,
        failed = required.failed_count(),
        "assets ready, starting render loop"
    );
    next.set(LoadState::Running);
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;

    #[derive(Resource, Default)]
    struct RunningEntered(u32);

    fn count_running(mut entered: ResMut<RunningEntered>) {
        entered.0 += 1;
    }

    /// A headless app with the gate but without the asset pipeline.
    fn gate_app() -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<LoadState>()
            .init_resource::<RequiredAssets>()
            .init_resource::<RunningEntered>()
            .add_message::<AssetSettled>()
            .add_systems(Startup, begin_loading)
            .add_systems(
                Update,
                (
                    record_settled_assets,
                    open_gate.run_if(in_state(LoadState::Loading)),
                )
                    .chain(),
            )
            .add_systems(OnEnter(LoadState::Ready), start_render_loop)
            .add_systems(OnEnter(LoadState::Running), count_running);
        app
    }

    fn image_ids(count: usize) -> (Assets<Image>, Vec<UntypedAssetId>) {
        let mut images = Assets::<Image>::default();
        let ids = (0..count)
            .map(|_| images.add(Image::default()).id().untyped())
            .collect();
        (images, ids)
    }

    fn run_frames(app: &mut App, frames: usize) {
        for _ in 0..frames {
            app.update();
        }
    }

    fn state(app: &App) -> LoadState {
        *app.world().resource::<State<LoadState>>().get()
    }

    #[test]
    fn test_required_assets_bookkeeping() {
        let (_images, ids) = image_ids(2);
        let mut required = RequiredAssets::default();
        required.require(ids[0]);
        required.require(ids[1]);

        assert!(!required.is_complete());
        assert_eq!(required.progress(), (0, 2));

        assert!(required.settle(ids[0], AssetOutcome::Loaded));
        assert!(!required.settle(ids[0], AssetOutcome::Loaded));
        assert_eq!(required.progress(), (1, 2));

        assert!(required.settle(ids[1], AssetOutcome::Failed));
        assert!(required.is_complete());
        assert_eq!(required.failed_count(), 1);

        // Requiring an already settled asset does not reopen the gate.
        required.require(ids[1]);
        assert!(required.is_complete());
    }

    #[test]
    fn test_no_required_assets_runs_immediately() {
        let mut app = gate_app();
        run_frames(&mut app, 5);

        assert_eq!(state(&app), LoadState::Running);
        assert_eq!(app.world().resource::<RunningEntered>().0, 1);
    }

    #[test]
    fn test_waits_for_every_required_asset() {
        let (_images, ids) = image_ids(2);
        let mut app = gate_app();
        for &id in &ids {
            app.world_mut().resource_mut::<RequiredAssets>().require(id);
        }

        run_frames(&mut app, 5);
        assert_eq!(state(&app), LoadState::Loading);

        app.world_mut().write_message(AssetSettled {
            id: ids[0],
            outcome: AssetOutcome::Loaded,
        });
        run_frames(&mut app, 5);
        assert_eq!(state(&app), LoadState::Loading);

        // A failed texture still lets rendering start.
        app.world_mut().write_message(AssetSettled {
            id: ids[1],
            outcome: AssetOutcome::Failed,
        });
        run_frames(&mut app, 5);
        assert_eq!(state(&app), LoadState::Running);
    }

    #[test]
    fn test_running_is_entered_exactly_once() {
        let (_images, ids) = image_ids(1);
        let mut app = gate_app();
        app.world_mut().resource_mut::<RequiredAssets>().require(ids[0]);
        run_frames(&mut app, 2);

        for _ in 0..3 {
            app.world_mut().write_message(AssetSettled {
                id: ids[0],
                outcome: AssetOutcome::Loaded,
            });
            run_frames(&mut app, 4);
        }

        assert_eq!(state(&app), LoadState::Running);
        assert_eq!(app.world().resource::<RunningEntered>().0, 1);
    }

    #[test]
    fn test_unrelated_assets_do_not_open_gate() {
        let (_images, ids) = image_ids(2);
        let mut app = gate_app();
        app.world_mut().resource_mut::<RequiredAssets>().require(ids[0]);

        app.world_mut().write_message(AssetSettled {
            id: ids[1],
            outcome: AssetOutcome::Loaded,
        });
        run_frames(&mut app, 5);

        assert_eq!(state(&app), LoadState::Loading);
    }
}
