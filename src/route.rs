//! Route identifier extraction.
//!
//! Routes reach the realtime layer with a feed-qualified GTFS id such as
//! `"tampere:3A"`. Broker topics only carry the operator-local part.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TopicError};

/// Minimal route metadata needed to build a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMetadata {
    /// Composite id in `<feedPrefix>:<routeCode>` form.
    pub gtfs_id: String,
}

impl RouteMetadata {
    pub fn new(gtfs_id: impl Into<String>) -> Self {
        Self {
            gtfs_id: gtfs_id.into(),
        }
    }
}

/// How an operator maps route metadata to the route segment of its topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSelector {
    /// Strip the feed prefix, see [`default_route_selector`].
    FeedPrefixed,
}

impl RouteSelector {
    pub fn select(&self, route: &RouteMetadata) -> Result<String> {
        match self {
            RouteSelector::FeedPrefixed => default_route_selector(route),
        }
    }
}

/// Returns everything after the first `:` of the route's GTFS id.
///
/// # Errors
///
/// [`TopicError::MalformedRouteId`] when the id has no `:` at all. An id
/// ending in `:` yields an empty route code.
pub fn default_route_selector(route: &RouteMetadata) -> Result<String> {
    match route.gtfs_id.split_once(':') {
        Some((_, code)) => Ok(code.to_string()),
        None => {
            warn!(gtfs_id = %route.gtfs_id, "Route id has no feed prefix");
            Err(TopicError::MalformedRouteId(route.gtfs_id.clone()))
        }
    }
}
