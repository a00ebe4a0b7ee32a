//! Data types for places API responses.

use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::Result;

/// A point on the globe in degrees.
///
/// Values are taken as-is: the API is trusted to send latitudes in
/// `[-90, 90]` and longitudes in `[-180, 180]`, and anything else still
/// projects through the periodic trig functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// An entry of the response that could not be turned into a coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    /// Position of the entry in the response's `data` array.
    pub index: usize,
    /// Why the entry was rejected.
    pub reason: String,
}

/// The coordinates extracted from one places response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceBatch {
    /// Valid coordinates, in response order.
    pub coordinates: Vec<GeoCoordinate>,
    /// Entries that were skipped.
    pub rejected: Vec<Rejected>,
}

/// Top-level document: `{ "data": [ ... ] }`.
///
/// Entries stay raw here so that a value one entry cannot hold (such as a
/// number outside the `f64` range) only rejects that entry.
#[derive(Debug, Deserialize)]
struct Document {
    data: Vec<Box<RawValue>>,
}

/// One entry of `data`. Everything besides the coordinates is ignored.
#[derive(Debug, Deserialize)]
struct Entry {
    attributes: Attributes,
}

#[derive(Debug, Deserialize)]
struct Attributes {
    latitude: f64,
    longitude: f64,
}

impl PlaceBatch {
    /// Parse a places response body.
    ///
    /// Fails only if the body is not JSON or has no `data` array. Entries
    /// with missing or mistyped coordinates are skipped and recorded in
    /// [`rejected`](Self::rejected).
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let document: Document = serde_json::from_slice(body)?;

        let mut batch = PlaceBatch::default();
        for (index, raw) in document.data.iter().enumerate() {
            match serde_json::from_str::<Entry>(raw.get()) {
                Ok(Entry { attributes }) => batch
                    .coordinates
                    .push(GeoCoordinate::new(attributes.latitude, attributes.longitude)),
                Err(e) => batch.rejected.push(Rejected {
                    index,
                    reason: e.to_string(),
                }),
            }
        }

        Ok(batch)
    }

    /// Total number of entries the response contained.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.coordinates.len() + self.rejected.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_parse_valid_response() {
        let body = br#"{
            "data": [
                { "id": "1", "type": "place", "attributes": { "name": "Paris", "latitude": 48.75, "longitude": 2.25 } },
                { "id": "2", "type": "place", "attributes": { "latitude": -33.5, "longitude": 18 } }
            ],
            "meta": { "count": 2 }
        }"#;

        let batch = PlaceBatch::from_json(body).unwrap();
        assert_eq!(
            batch.coordinates,
            vec![
                GeoCoordinate::new(48.75, 2.25),
                GeoCoordinate::new(-33.5, 18.0),
            ]
        );
        assert!(batch.rejected.is_empty());
    }

    #[test]
    fn test_one_malformed_entry_among_five_valid_is_skipped() {
        let body = br#"{
            "data": [
                { "attributes": { "latitude": 1.0, "longitude": 2.0 } },
                { "attributes": { "latitude": 3.0, "longitude": 4.0 } },
                { "attributes": { "latitude": "north", "longitude": 5.0 } },
                { "attributes": { "latitude": 6.0, "longitude": 7.0 } },
                { "attributes": { "latitude": 8.0, "longitude": 9.0 } }
            ]
        }"#;

        let batch = PlaceBatch::from_json(body).unwrap();
        assert_eq!(batch.coordinates.len(), 4);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].index, 2);
        assert_eq!(batch.entry_count(), 5);
        assert_eq!(batch.coordinates[2], GeoCoordinate::new(6.0, 7.0));
    }

    #[test]
    fn test_missing_fields_are_rejected_per_entry() {
        let body = br#"{
            "data": [
                { "attributes": { "latitude": 10.0 } },
                { "name": "no attributes" },
                { "attributes": { "latitude": null, "longitude": 1.0 } },
                42,
                { "attributes": { "latitude": 11.0, "longitude": 12.0 } }
            ]
        }"#;

        let batch = PlaceBatch::from_json(body).unwrap();
        assert_eq!(batch.coordinates, vec![GeoCoordinate::new(11.0, 12.0)]);
        let indices: Vec<usize> = batch.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(batch.rejected[0].reason.contains("longitude"));
    }

    #[test]
    fn test_unrepresentable_number_is_rejected_per_entry() {
        let body = br#"{
            "data": [
                { "attributes": { "latitude": 1.0, "longitude": 2.0 } },
                { "attributes": { "latitude": 1e400, "longitude": 2.0 } },
                { "attributes": { "latitude": 3.0, "longitude": 4.0 } }
            ]
        }"#;

        let batch = PlaceBatch::from_json(body).unwrap();
        assert_eq!(
            batch.coordinates,
            vec![GeoCoordinate::new(1.0, 2.0), GeoCoordinate::new(3.0, 4.0)]
        );
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].index, 1);
    }

    #[test]
    fn test_out_of_range_coordinates_are_kept() {
        let body = br#"{ "data": [ { "attributes": { "latitude": 120.0, "longitude": -400.0 } } ] }"#;

        let batch = PlaceBatch::from_json(body).unwrap();
        assert_eq!(batch.coordinates, vec![GeoCoordinate::new(120.0, -400.0)]);
    }

    #[test]
    fn test_empty_data() {
        let batch = PlaceBatch::from_json(br#"{ "data": [] }"#).unwrap();
        assert_eq!(batch, PlaceBatch::default());
    }

    #[test]
    fn test_document_errors() {
        let bodies: [&[u8]; 4] = [
            b"not json",
            br#"{ "places": [] }"#,
            br#"{ "data": { "attributes": {} } }"#,
            b"[]",
        ];
        for body in bodies {
            let result = PlaceBatch::from_json(body);
            assert!(matches!(result, Err(Error::Json { .. })), "{result:?}");
        }
    }
}
