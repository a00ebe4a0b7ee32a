//! Places API ingestion.
//!
//! One fetch at startup, off the main thread. The parsed batch arrives over a
//! channel and is folded into the globe, one marker per coordinate, in the
//! order the API listed them. Ingestion is independent of the load gate:
//! markers may arrive before or after the first frame renders.

use bevy::prelude::*;
use places::{Client, PlaceBatch};

use crate::async_runtime::TaskSpawner;
use crate::constants::PLACES_URL;
use crate::globe::GlobeWriter;

/// Plugin for fetching places and turning them into markers.
pub struct PlacesIngestPlugin;

impl Plugin for PlacesIngestPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(PlacesFeed::new(Client::new(PLACES_URL)))
            .add_systems(Startup, start_places_fetch)
            .add_systems(Update, (poll_places_fetch, apply_pending_places).chain());
    }
}

/// Where the places feed is at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedStatus {
    #[default]
    Idle,
    Fetching,
    /// Markers have been added for every valid entry.
    Applied { added: usize, rejected: usize },
    /// The request or document failed; no retry.
    Failed(String),
}

type FetchResult = places::Result<PlaceBatch>;

/// The places client plus the channel its fetch task reports on.
#[derive(Resource)]
pub struct PlacesFeed {
    client: Client,
    status: FeedStatus,
    /// Received but not yet applied; waits for the globe to exist.
    pending: Option<PlaceBatch>,
    rx: async_channel::Receiver<FetchResult>,
    tx: async_channel::Sender<FetchResult>,
}

impl PlacesFeed {
    #[must_use]
    pub fn new(client: Client) -> Self {
        let (tx, rx) = async_channel::bounded(1);
        Self {
            client,
            status: FeedStatus::Idle,
            pending: None,
            rx,
            tx,
        }
    }

    #[must_use]
    pub fn status(&self) -> &FeedStatus {
        &self.status
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[allow(clippy::needless_pass_by_value)]
fn start_places_fetch(mut feed: ResMut<PlacesFeed>, spawner: TaskSpawner) {
    let client = feed.client.clone();
    let tx = feed.tx.clone();

    spawner.deliver(async move { client.fetch_places().await }, tx);

    tracing::info!(url = feed.client.url(), "fetching places");
    feed.status = FeedStatus::Fetching;
}

/// Receive the fetch result, if it has arrived.
fn poll_places_fetch(mut feed: ResMut<PlacesFeed>) {
    let Ok(result) = feed.rx.try_recv() else {
        return;
    };

    match result {
        Ok(batch) => {
            for rejected in &batch.rejected {
                tracing::warn!(
                    index = rejected.index,
                    reason = %rejected.reason,
                    "skipping malformed place"
                );
            }
            tracing::info!(
                entries = batch.entry_count(),
                places = batch.coordinates.len(),
                rejected = batch.rejected.len(),
                "received places"
            );
            feed.pending = Some(batch);
        }
        Err(e) => {
            tracing::error!("Failed to load places: {e}");
            feed.status = FeedStatus::Failed(e.to_string());
        }
    }
}

/// Add a marker for every coordinate of a received batch.
fn apply_pending_places(mut feed: ResMut<PlacesFeed>, mut globe: GlobeWriter) {
    if !feed.has_pending() || !globe.is_ready() {
        return;
    }
    let Some(batch) = feed.pending.take() else {
        return;
    };

    let added = batch
        .coordinates
        .iter()
        .filter_map(|coordinate| globe.add_marker_at(coordinate.latitude, coordinate.longitude))
        .count();

    tracing::info!(added, "added place markers");
    feed.status = FeedStatus::Applied {
        added,
        rejected: batch.rejected.len(),
    };
}
