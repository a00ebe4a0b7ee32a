//! Async client for the places API.
//!
//! The API serves a list of points of interest; this crate only cares about
//! their geographic coordinates. Parsing is tolerant per entry: one malformed
//! place is reported and skipped without discarding the rest of the response.
//!
//! # Example
//!
//! ```ignore
//! use places::Client;
//!
//! let client = Client::new("http://localhost:3000/api/v1/places.json");
//! let batch = client.fetch_places().await?;
//! for coordinate in &batch.coordinates {
//!     println!("{}, {}", coordinate.latitude, coordinate.longitude);
//! }
//! ```

mod client;
mod error;
pub mod types;

pub use client::Client;
pub use error::{Error, Result};
pub use types::{GeoCoordinate, PlaceBatch, Rejected};
