//! Maps decoded GTFS-RT vehicle positions to subscription topics.
//!
//! For every vehicle that reports a trip, a route and a position, the
//! standardized topic filter that would deliver that vehicle is derived.
//! GTFS-RT carries no headsign, so that level stays a `+` wildcard, as do
//! any other trip fields the vehicle leaves out.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::geohash::geohash;
use crate::gtfs_rt::{FeedMessage, VehiclePosition};
use crate::matcher::topic_matches;
use crate::topic::{TripAttributes, standardized_topic};

const WILDCARD: &str = "+";

/// One CSV row: a vehicle and the topic filter that selects it.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleTopic {
    pub timestamp: DateTime<Utc>,
    pub feed_id: String,
    pub entity_id: String,
    pub vehicle_id: Option<String>,
    pub route: String,
    pub direction: Option<u32>,
    pub trip_id: Option<String>,
    pub trip_start_time: Option<String>,
    pub latitude: f32,
    pub longitude: f32,
    pub topic: String,
}

#[derive(Debug, Default)]
pub struct VehicleTopics {
    pub records: Vec<VehicleTopic>,
    /// Vehicle entities without trip, route or position, or deleted ones.
    pub skipped: usize,
    /// Vehicles whose position could not be geohashed.
    pub invalid: usize,
}

impl VehicleTopics {
    /// Derives topics for every usable vehicle in `feed`.
    pub fn from_feed(feed: &FeedMessage, feed_id: &str) -> Self {
        let now = Utc::now();
        let mut out = VehicleTopics::default();

        for e in &feed.entity {
            let Some(v) = &e.vehicle else {
                continue;
            };
            if e.is_deleted.unwrap_or(false) {
                out.skipped += 1;
                continue;
            }

            match vehicle_topic(v, feed_id, &e.id, now) {
                None => out.skipped += 1,
                Some(Err(err)) => {
                    debug!(entity_id = %e.id, error = %err, "Vehicle position rejected");
                    out.invalid += 1;
                }
                Some(Ok(record)) => out.records.push(record),
            }
        }

        debug!(
            feed_id,
            records = out.records.len(),
            skipped = out.skipped,
            invalid = out.invalid,
            "Derived vehicle topics"
        );
        out
    }

    /// Keeps only records whose topic falls under `filter`.
    pub fn retain_matching(&mut self, filter: &str) {
        self.records.retain(|r| topic_matches(filter, &r.topic));
    }
}

/// Widens a feed coordinate through its shortest decimal form, so `61.498f32`
/// becomes `61.498` rather than `61.49799728393555`.
fn widen(degrees: f32) -> f64 {
    degrees
        .to_string()
        .parse()
        .unwrap_or_else(|_| f64::from(degrees))
}

/// Returns `None` when the vehicle lacks the fields a topic needs.
fn vehicle_topic(
    v: &VehiclePosition,
    feed_id: &str,
    entity_id: &str,
    timestamp: DateTime<Utc>,
) -> Option<Result<VehicleTopic>> {
    let trip = v.trip.as_ref()?;
    let route = trip.route_id.as_deref()?;
    let position = v.position.as_ref()?;

    let or_wildcard = |field: &Option<String>| field.clone().unwrap_or_else(|| WILDCARD.to_string());

    let build = || -> Result<VehicleTopic> {
        let levels = geohash(widen(position.latitude), widen(position.longitude))?;
        let attrs = TripAttributes::new(
            route,
            trip.direction_id
                .map(|d| d.to_string())
                .unwrap_or_else(|| WILDCARD.to_string()),
            or_wildcard(&trip.start_time),
        )
        .with_headsign(WILDCARD)
        .with_trip_info(feed_id, or_wildcard(&trip.trip_id))
        .with_geo_hash(levels);
        let topic = standardized_topic(&attrs)?;

        Ok(VehicleTopic {
            timestamp,
            feed_id: feed_id.to_string(),
            entity_id: entity_id.to_string(),
            vehicle_id: v.vehicle.as_ref().and_then(|d| d.id.clone()),
            route: attrs.route,
            direction: trip.direction_id,
            trip_id: trip.trip_id.clone(),
            trip_start_time: trip.start_time.clone(),
            latitude: position.latitude,
            longitude: position.longitude,
            topic,
        })
    };

    Some(build())
}
