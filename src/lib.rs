//! Realtime vehicle-position topic resolution for transit operators.
//!
//! [`registry`] holds the compiled-in operator table. Each
//! [`OperatorConfig`] knows its broker, its route selector and which
//! [`ResolverKind`] builds its subscription topics.

pub mod error;
pub mod fetch;
pub mod geohash;
pub mod matcher;
pub mod output;
pub mod parser;
pub mod registry;
pub mod route;
pub mod topic;
pub mod vehicles;

pub use error::TopicError;
pub use registry::{Credentials, OperatorConfig, Registry, lookup};
pub use route::{RouteMetadata, RouteSelector, default_route_selector};
pub use topic::{ResolverKind, TripAttributes};

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
