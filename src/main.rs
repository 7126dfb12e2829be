//! CLI entry point for realtime topic resolution.
//!
//! Lists the operator registry, resolves subscription topics for a trip,
//! and maps GTFS-RT vehicle position snapshots to their topics.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use realtime_topics::{
    RouteMetadata, TripAttributes,
    fetch::{BasicClient, fetch_bytes},
    lookup,
    output::{append_records, print_json},
    parser::parse_feed,
    registry::Registry,
    vehicles::VehicleTopics,
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "realtime_topics")]
#[command(about = "Resolve realtime vehicle-position topics per transit operator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured operators
    Operators {
        /// Only show operators whose realtime integration is enabled
        #[arg(short, long)]
        active_only: bool,

        /// Print the full configuration as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve the subscription topic for a trip
    Topic {
        /// Operator key, e.g. "tampere"
        #[arg(short, long)]
        operator: String,

        /// Feed-qualified route id, e.g. "tampere:12"
        #[arg(short, long)]
        route_id: String,

        #[arg(short, long)]
        direction: String,

        /// Trip start time, e.g. "08:15"
        #[arg(short, long)]
        start_time: String,

        #[arg(long, default_value = "+")]
        headsign: String,

        #[arg(long, default_value = "+")]
        trip_id: String,

        /// Geohash levels separated by '/', e.g. "61;23/47/96/81"
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        geohash: Option<String>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Resolve even if the operator's realtime integration is disabled
        #[arg(long)]
        allow_inactive: bool,
    },
    /// Map vehicles in a GTFS-RT snapshot to their subscription topics
    Vehicles {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Operator key the snapshot belongs to
        #[arg(short, long)]
        operator: String,

        /// CSV file to append results to; logged as JSON when omitted
        #[arg(long)]
        output: Option<String>,

        /// Only keep vehicles matching this topic filter
        #[arg(short, long)]
        filter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/realtime_topics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("realtime_topics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Operators { active_only, json } => list_operators(active_only, json)?,
        Commands::Topic {
            operator,
            route_id,
            direction,
            start_time,
            headsign,
            trip_id,
            geohash,
            lat,
            lon,
            allow_inactive,
        } => {
            let levels: Vec<String> = match (geohash, lat.zip(lon)) {
                (Some(levels), _) => levels.split('/').map(str::to_string).collect(),
                (None, Some((lat, lon))) => realtime_topics::geohash::geohash(lat, lon)?.to_vec(),
                (None, None) => Vec::new(),
            };
            let trip = TripAttributes::new(String::new(), direction, start_time)
                .with_headsign(headsign)
                .with_trip_info(operator.clone(), trip_id)
                .with_geo_hash(levels);

            let topic = resolve_topic(&operator, &route_id, trip, allow_inactive)?;
            println!("{topic}");
        }
        Commands::Vehicles {
            source,
            operator,
            output,
            filter,
        } => vehicles(&source, &operator, output.as_deref(), filter.as_deref()).await?,
    }

    Ok(())
}

fn list_operators(active_only: bool, json: bool) -> Result<()> {
    let registry = Registry::global();
    let entries: Vec<_> = if active_only {
        registry.active().collect()
    } else {
        registry.iter().collect()
    };

    if json {
        let map: std::collections::BTreeMap<_, _> = entries.into_iter().collect();
        return print_json(&map);
    }

    for (key, config) in &entries {
        info!(
            operator = key,
            resolver = ?config.resolver,
            broker = config.broker_uri,
            authenticated = config.credentials.is_some(),
            position_extension = config.supports_position_extension,
            active = config.active,
            "Operator"
        );
    }
    info!(total = entries.len(), "Operator list");
    Ok(())
}

/// Looks up the operator, extracts the route code and builds the topic.
#[tracing::instrument(skip(trip))]
fn resolve_topic(
    operator: &str,
    route_id: &str,
    mut trip: TripAttributes,
    allow_inactive: bool,
) -> Result<String> {
    let config = lookup(operator)?;
    if !config.active {
        if !allow_inactive {
            bail!("realtime integration for '{operator}' is disabled (use --allow-inactive)");
        }
        warn!("Operator is inactive, resolving anyway");
    }

    trip.route = config.route_code(&RouteMetadata::new(route_id))?;
    let topic = config.topic(&trip)?;
    info!(%topic, broker = config.broker_uri, "Resolved topic");
    Ok(topic)
}

/// Loads feed data from a local file path or fetches it over HTTP.
#[tracing::instrument]
async fn fetcher(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let client = BasicClient::new()?;
        fetch_bytes(&client, source).await?
    } else {
        std::fs::read(source)?
    };
    Ok(bytes)
}

#[tracing::instrument(skip(output, filter))]
async fn vehicles(
    source: &str,
    operator: &str,
    output: Option<&str>,
    filter: Option<&str>,
) -> Result<()> {
    let config = lookup(operator)?;
    if !config.supports_position_extension {
        bail!("operator '{operator}' does not publish GTFS-RT vehicle positions");
    }

    let bytes = fetcher(source).await?;
    let feed = parse_feed(&bytes)?;
    let mut topics = VehicleTopics::from_feed(&feed, operator);
    if let Some(filter) = filter {
        topics.retain_matching(filter);
    }

    info!(
        vehicles = topics.records.len(),
        skipped = topics.skipped,
        invalid = topics.invalid,
        "Vehicle topics derived"
    );

    match output {
        Some(path) => append_records(path, &topics.records)?,
        None => print_json(&topics.records)?,
    }
    Ok(())
}
