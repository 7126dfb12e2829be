//! Error type shared by the registry, route selectors and topic resolvers.

use thiserror::Error;

/// Failures raised while resolving a realtime subscription topic.
///
/// Every variant is a deterministic function of the input, so retrying
/// with the same arguments always fails the same way.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopicError {
    /// A composite route id did not contain the `:` feed delimiter.
    #[error("malformed route id '{0}': expected '<feed>:<route>'")]
    MalformedRouteId(String),

    /// The standardized resolver needs four geohash levels.
    #[error("geohash needs 4 components, got {len}")]
    InvalidGeoHash { len: usize },

    /// No operator is registered under this key.
    #[error("unknown operator '{0}'")]
    OperatorNotFound(String),

    #[error("coordinate out of range: lat {lat}, lon {lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

pub type Result<T> = std::result::Result<T, TopicError>;
