//! Output helpers for registry listings and vehicle topic records.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends `records` as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist. Nothing is
/// written, and no file is created, for an empty slice.
pub fn append_records<T: Serialize>(path: &str, records: &[T]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = records.len(), "Appending CSV records");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("cannot open '{path}' for append"))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::vehicles::VehicleTopic;
    use chrono::Utc;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn record(entity_id: &str) -> VehicleTopic {
        VehicleTopic {
            timestamp: Utc::now(),
            feed_id: "tampere".to_string(),
            entity_id: entity_id.to_string(),
            vehicle_id: None,
            route: "12".to_string(),
            direction: Some(0),
            trip_id: Some("T1".to_string()),
            trip_start_time: None,
            latitude: 61.5,
            longitude: 23.75,
            topic: "/gtfsrt/vp/tampere/+/+/+/12/0/+/T1/+/+/+/61;23/57/05/00/#".to_string(),
        }
    }

    #[test]
    fn test_print_json_registry_does_not_panic() {
        let entries: Vec<_> = Registry::global().iter().collect();
        print_json(&entries).unwrap();
    }

    #[test]
    fn test_append_records_creates_file() {
        let path = temp_path("realtime_topics_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        append_records(&path, &[record("v1")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("/gtfsrt/vp/tampere/"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("realtime_topics_test_header.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &[record("v1")]).unwrap();
        append_records(&path, &[record("v2"), record("v3")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        // 1 header + 3 data rows
        assert_eq!(lines.len(), 4);
        assert_eq!(lines.iter().filter(|l| l.contains("entity_id")).count(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_nothing_leaves_no_file() {
        let path = temp_path("realtime_topics_test_empty.csv");
        let _ = fs::remove_file(&path);

        append_records::<VehicleTopic>(&path, &[]).unwrap();
        assert!(!Path::new(&path).exists());
    }
}
