//! Static per-operator realtime configuration.
//!
//! The table is compiled in and built once on first access. Nothing mutates
//! it afterwards; callers only get shared references.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{Result, TopicError};
use crate::route::{RouteMetadata, RouteSelector};
use crate::topic::{ResolverKind, TripAttributes};

const HSL_BROKER: &str = "wss://mqtt.hsl.fi";
const WALTTI_BROKER: &str = "wss://mqtt.lmj.fi/mqtt";
const WALTTI_CREDENTIALS: Credentials = Credentials {
    username: "user",
    password: "userpass",
};

/// Broker login. The password is never serialized or debug-printed.
#[derive(Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: &'static str,
    #[serde(skip_serializing)]
    pub password: &'static str,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Realtime settings for one transit operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorConfig {
    pub resolver: ResolverKind,
    pub broker_uri: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    /// Operator also publishes standardized GTFS-RT vehicle positions.
    pub supports_position_extension: bool,
    pub route_selector: RouteSelector,
    /// Feature flag; inactive entries are complete but should not be used.
    pub active: bool,
}

impl OperatorConfig {
    const fn legacy(broker_uri: &'static str, active: bool) -> Self {
        Self {
            resolver: ResolverKind::LegacyVehiclePosition,
            broker_uri,
            credentials: None,
            supports_position_extension: false,
            route_selector: RouteSelector::FeedPrefixed,
            active,
        }
    }

    const fn waltti(active: bool) -> Self {
        Self {
            resolver: ResolverKind::StandardizedVehiclePosition,
            broker_uri: WALTTI_BROKER,
            credentials: Some(WALTTI_CREDENTIALS),
            supports_position_extension: true,
            route_selector: RouteSelector::FeedPrefixed,
            active,
        }
    }

    /// Extracts the topic route segment from `route`.
    pub fn route_code(&self, route: &RouteMetadata) -> Result<String> {
        self.route_selector.select(route)
    }

    /// Builds this operator's subscription topic for `trip`.
    pub fn topic(&self, trip: &TripAttributes) -> Result<String> {
        self.resolver.resolve(trip)
    }
}

static OPERATORS: &[(&str, OperatorConfig)] = &[
    ("HSL", OperatorConfig::legacy(HSL_BROKER, false)),
    ("tampere", OperatorConfig::waltti(true)),
    ("LINKKI", OperatorConfig::waltti(false)),
    ("Lappeenranta", OperatorConfig::waltti(false)),
    ("Joensuu", OperatorConfig::waltti(false)),
    ("Kuopio", OperatorConfig::waltti(false)),
];

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| Registry::from_entries(OPERATORS));

/// Read-only operator key to [`OperatorConfig`] map.
#[derive(Debug)]
pub struct Registry {
    entries: HashMap<&'static str, OperatorConfig>,
}

impl Registry {
    /// Returns the process-wide registry.
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    fn from_entries(entries: &[(&'static str, OperatorConfig)]) -> Self {
        Self {
            entries: entries.iter().cloned().collect(),
        }
    }

    /// Exact, case-sensitive lookup. Never falls back to another operator.
    pub fn lookup(&self, key: &str) -> Result<&OperatorConfig> {
        let found = self.entries.get(key);
        debug!(operator = key, found = found.is_some(), "Registry lookup");
        found.ok_or_else(|| TopicError::OperatorNotFound(key.to_string()))
    }

    /// Iterates over all `(key, config)` pairs, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &OperatorConfig)> {
        let mut keys: Vec<_> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys.into_iter().map(move |k| (k, &self.entries[k]))
    }

    /// Iterates over active operators only.
    pub fn active(&self) -> impl Iterator<Item = (&'static str, &OperatorConfig)> {
        self.iter().filter(|(_, config)| config.active)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Looks `key` up in the global registry.
pub fn lookup(key: &str) -> Result<&'static OperatorConfig> {
    Registry::global().lookup(key)
}
