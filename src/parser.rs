//! Decoder for GTFS Realtime payloads published on standardized topics.

use anyhow::{Context, Result};
use prost::Message;
use tracing::debug;

use crate::gtfs_rt::FeedMessage;

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from a broker payload
/// or a feed snapshot.
///
/// # Errors
///
/// Returns an error if the bytes are not valid protobuf for a `FeedMessage`.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage> {
    let feed = FeedMessage::decode(bytes)
        .with_context(|| format!("invalid GTFS-RT payload ({} bytes)", bytes.len()))?;
    debug!(
        version = %feed.header.gtfs_realtime_version,
        entities = feed.entity.len(),
        "Decoded feed"
    );
    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::{FeedEntity, FeedHeader, Position, VehiclePosition};

    #[test]
    fn test_parse_empty_bytes_returns_default_feed() {
        // Empty input is a valid protobuf encoding of a default message
        let feed = parse_feed(&[]).unwrap();
        assert_eq!(feed.header.gtfs_realtime_version, "");
        assert!(feed.entity.is_empty());
    }

    #[test]
    fn test_parse_invalid_bytes() {
        let invalid_bytes = vec![0xFF, 0xFE, 0x00, 0x01];
        let err = parse_feed(&invalid_bytes).unwrap_err();
        assert!(err.to_string().contains("4 bytes"));
    }

    #[test]
    fn test_parse_vehicle_payload() {
        let feed = FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: "2.0".to_string(),
                timestamp: Some(1234567890),
                incrementality: None,
                feed_version: None,
            },
            entity: vec![FeedEntity {
                id: "v1".to_string(),
                vehicle: Some(VehiclePosition {
                    position: Some(Position {
                        latitude: 61.5,
                        longitude: 23.75,
                        bearing: Some(180.0),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }],
        };

        let parsed = parse_feed(&feed.encode_to_vec()).unwrap();
        assert_eq!(parsed.header.timestamp, Some(1234567890));
        assert_eq!(parsed, feed);
    }
}
