//! Subscription topic templates for vehicle-position feeds.
//!
//! Two topic layouts are in use:
//!
//! | Kind                          | Template |
//! |-------------------------------|----------|
//! | `LegacyVehiclePosition`       | `/hfp/v1/journey/ongoing/+/+/+/{route}/{direction}/+/{start}/#` |
//! | `StandardizedVehiclePosition` | `/gtfsrt/vp/{feed}/+/+/+/{route}/{direction}/{headsign}/{trip}/+/{start}/+/{g0}/{g1}/{g2}/{g3}/#` |
//!
//! `+` matches one topic level and `#` the rest, as in MQTT.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TopicError};

/// Number of geohash levels carried by a standardized topic.
pub const GEOHASH_LEVELS: usize = 4;

/// Trip attributes a topic can be built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripAttributes {
    /// Operator-local route code, as returned by a route selector.
    pub route: String,
    pub direction: String,
    /// Scheduled start time of the trip, e.g. `"14:30"`.
    pub trip_start_time: String,
    pub headsign: String,
    pub feed_id: String,
    pub trip_id: String,
    pub geo_hash: Vec<String>,
}

impl TripAttributes {
    pub fn new(
        route: impl Into<String>,
        direction: impl Into<String>,
        trip_start_time: impl Into<String>,
    ) -> Self {
        Self {
            route: route.into(),
            direction: direction.into(),
            trip_start_time: trip_start_time.into(),
            ..Default::default()
        }
    }

    pub fn with_headsign(mut self, headsign: impl Into<String>) -> Self {
        self.headsign = headsign.into();
        self
    }

    /// Set feed and trip identifiers
    pub fn with_trip_info(mut self, feed_id: impl Into<String>, trip_id: impl Into<String>) -> Self {
        self.feed_id = feed_id.into();
        self.trip_id = trip_id.into();
        self
    }

    pub fn with_geo_hash<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.geo_hash = levels.into_iter().map(|l| l.to_string()).collect();
        self
    }
}

/// Selects which topic template an operator publishes under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResolverKind {
    /// Per-operator HFP feed. Predates fine-grained filtering, so only
    /// route, direction and start time end up in the topic.
    LegacyVehiclePosition,
    /// GTFS-RT vehicle positions republished over MQTT.
    StandardizedVehiclePosition,
}

impl ResolverKind {
    /// Builds the subscription topic for `trip` with this kind's template.
    pub fn resolve(&self, trip: &TripAttributes) -> Result<String> {
        let topic = match self {
            ResolverKind::LegacyVehiclePosition => legacy_topic(trip),
            ResolverKind::StandardizedVehiclePosition => standardized_topic(trip)?,
        };
        debug!(kind = ?self, %topic, "Resolved topic");
        Ok(topic)
    }
}

/// Formats the legacy HFP topic. Headsign, feed, trip and geohash are ignored.
pub fn legacy_topic(trip: &TripAttributes) -> String {
    format!(
        "/hfp/v1/journey/ongoing/+/+/+/{route}/{direction}/+/{start}/#",
        route = trip.route,
        direction = trip.direction,
        start = trip.trip_start_time,
    )
}

/// Formats the standardized GTFS-RT topic.
///
/// # Errors
///
/// [`TopicError::InvalidGeoHash`] when fewer than [`GEOHASH_LEVELS`]
/// geohash components are given. Extra components are ignored.
pub fn standardized_topic(trip: &TripAttributes) -> Result<String> {
    let [g0, g1, g2, g3] = match trip.geo_hash.get(..GEOHASH_LEVELS) {
        Some([g0, g1, g2, g3]) => [g0, g1, g2, g3],
        _ => {
            warn!(len = trip.geo_hash.len(), "Geohash too short for standardized topic");
            return Err(TopicError::InvalidGeoHash {
                len: trip.geo_hash.len(),
            });
        }
    };

    Ok(format!(
        "/gtfsrt/vp/{feed}/+/+/+/{route}/{direction}/{headsign}/{trip_id}/+/{start}/+/{g0}/{g1}/{g2}/{g3}/#",
        feed = trip.feed_id,
        route = trip.route,
        direction = trip.direction,
        headsign = trip.headsign,
        trip_id = trip.trip_id,
        start = trip.trip_start_time,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centre_trip() -> TripAttributes {
        TripAttributes::new("12", "0", "08:15")
            .with_headsign("Centre")
            .with_trip_info("tampere", "T1")
            .with_geo_hash(["61", "23", "45", "67"])
    }

    #[test]
    fn test_legacy_topic_template() {
        let trip = TripAttributes::new("55", "1", "14:30");
        assert_eq!(
            legacy_topic(&trip),
            "/hfp/v1/journey/ongoing/+/+/+/55/1/+/14:30/#"
        );
    }

    #[test]
    fn test_legacy_topic_ignores_other_attributes() {
        let bare = TripAttributes::new("55", "1", "14:30");
        let full = bare
            .clone()
            .with_headsign("Kamppi")
            .with_trip_info("HSL", "HSL:1055_20240101_Ma_1_1430")
            .with_geo_hash([60, 24, 19, 73]);
        assert_eq!(legacy_topic(&bare), legacy_topic(&full));
    }

    #[test]
    fn test_standardized_topic_template() {
        assert_eq!(
            standardized_topic(&centre_trip()).unwrap(),
            "/gtfsrt/vp/tampere/+/+/+/12/0/Centre/T1/+/08:15/+/61/23/45/67/#"
        );
    }

    #[test]
    fn test_standardized_topic_accepts_numeric_levels() {
        let trip = centre_trip().with_geo_hash([61, 23, 45, 67]);
        assert_eq!(
            standardized_topic(&trip).unwrap(),
            standardized_topic(&centre_trip()).unwrap()
        );
    }

    #[test]
    fn test_standardized_topic_ignores_extra_levels() {
        let trip = centre_trip().with_geo_hash(["61", "23", "45", "67", "89"]);
        assert!(standardized_topic(&trip).unwrap().ends_with("/61/23/45/67/#"));
    }

    #[test]
    fn test_short_geohash_is_rejected_every_time() {
        let trip = centre_trip().with_geo_hash(["61", "23", "45"]);
        for _ in 0..3 {
            assert_eq!(
                standardized_topic(&trip),
                Err(TopicError::InvalidGeoHash { len: 3 })
            );
        }
    }

    #[test]
    fn test_empty_geohash_is_rejected() {
        let trip = TripAttributes::new("12", "0", "08:15");
        assert_eq!(
            ResolverKind::StandardizedVehiclePosition.resolve(&trip),
            Err(TopicError::InvalidGeoHash { len: 0 })
        );
    }

    #[test]
    fn test_kind_dispatch() {
        let trip = centre_trip();
        assert_eq!(
            ResolverKind::LegacyVehiclePosition.resolve(&trip).unwrap(),
            "/hfp/v1/journey/ongoing/+/+/+/12/0/+/08:15/#"
        );
        assert_eq!(
            ResolverKind::StandardizedVehiclePosition
                .resolve(&trip)
                .unwrap(),
            standardized_topic(&trip).unwrap()
        );
    }
}
