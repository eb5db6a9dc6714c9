//! Per-city output files.
//!
//! Each city is written to `<output_dir>/hubs-<city>.json`, replacing any
//! previous file. Two layouts are supported (see [`OutputFormat`]):
//!
//! - `feature_collection`: GeoJSON `FeatureCollection` of `Point` features,
//!   coordinates in `[longitude, latitude]` order, plus a `metadata` block.
//! - `array`: bare array of hub objects.
//!
//! Serialization is deterministic: identical hubs produce identical bytes,
//! apart from `metadata.generated_at`.

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::config::OutputFormat;
use crate::models::{CityResult, HubId, HubRecord};

#[derive(Serialize)]
struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Feature<'a>>,
    metadata: Metadata<'a>,
}

#[derive(Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: Geometry,
    properties: HubProperties<'a>,
}

#[derive(Serialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: [f64; 2],
}

#[derive(Serialize)]
struct HubProperties<'a> {
    id: &'a HubId,
    name: &'a str,
    address: &'a str,
    city: &'a str,
    capacity: u32,
    available_bikes: u32,
    hub_type: &'a str,
    status: &'a str,
}

#[derive(Serialize)]
struct Metadata<'a> {
    city: &'a str,
    total_hubs: usize,
    generated_at: String,
    endpoints: &'a [String],
}

impl<'a> Feature<'a> {
    fn from_hub(hub: &'a HubRecord) -> Self {
        Feature {
            kind: "Feature",
            geometry: Geometry {
                kind: "Point",
                coordinates: [hub.longitude, hub.latitude],
            },
            properties: HubProperties {
                id: &hub.id,
                name: &hub.name,
                address: &hub.address,
                city: &hub.city,
                capacity: hub.capacity,
                available_bikes: hub.available,
                hub_type: &hub.hub_type,
                status: &hub.status,
            },
        }
    }
}

/// Output write failures.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to serialize hubs for {city}: {source}")]
    Serialize {
        city: String,
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Writes one JSON file per city into the output directory.
pub struct HubWriter {
    dir: PathBuf,
    format: OutputFormat,
}

impl HubWriter {
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        HubWriter {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the output directory if it does not exist yet.
    pub fn prepare(&self) -> Result<(), WriteError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| WriteError::CreateDir {
            path: self.dir.clone(),
            source,
        })
    }

    /// Deterministic file path for a city.
    pub fn path_for(&self, city: &str) -> PathBuf {
        self.dir.join(format!("hubs-{}.json", city))
    }

    /// Serialize a city result in the configured format (2-space indent).
    pub fn render(&self, result: &CityResult) -> Result<String, WriteError> {
        let rendered = match self.format {
            OutputFormat::FeatureCollection => {
                let collection = FeatureCollection {
                    kind: "FeatureCollection",
                    features: result.hubs.iter().map(Feature::from_hub).collect(),
                    metadata: Metadata {
                        city: &result.city,
                        total_hubs: result.hubs.len(),
                        generated_at: result.generated_at_iso(),
                        endpoints: &result.endpoints,
                    },
                };
                serde_json::to_string_pretty(&collection)
            }
            OutputFormat::Array => serde_json::to_string_pretty(&result.hubs),
        };

        rendered.map_err(|source| WriteError::Serialize {
            city: result.city.clone(),
            source,
        })
    }

    /// Write a city's file, overwriting any existing one.
    pub fn write(&self, result: &CityResult) -> Result<PathBuf, WriteError> {
        let mut contents = self.render(result)?;
        contents.push('\n');

        let path = self.path_for(&result.city);
        std::fs::write(&path, contents).map_err(|source| WriteError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::scratch_dir;
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn sample_result(hubs: Vec<HubRecord>) -> CityResult {
        CityResult {
            city: "ghent".into(),
            hubs,
            endpoints: vec!["https://host/api/public/cities/223/hubs/".into()],
            failed_endpoints: 0,
            generated_at: Utc.with_ymd_and_hms(2026, 10, 18, 6, 0, 0).unwrap(),
        }
    }

    fn sample_hub() -> HubRecord {
        HubRecord {
            id: HubId::Number(7.into()),
            name: "Central".into(),
            address: "Korenmarkt 1".into(),
            city: "ghent".into(),
            capacity: 10,
            available: 4,
            hub_type: "standard".into(),
            status: "active".into(),
            longitude: 3.72,
            latitude: 51.05,
        }
    }

    #[test]
    fn test_feature_collection_layout() {
        let writer = HubWriter::new("unused", OutputFormat::FeatureCollection);
        let rendered = writer.render(&sample_result(vec![sample_hub()])).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        let feature = &value["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"], json!([3.72, 51.05]));
        assert_eq!(
            feature["properties"],
            json!({
                "id": 7,
                "name": "Central",
                "address": "Korenmarkt 1",
                "city": "ghent",
                "capacity": 10,
                "available_bikes": 4,
                "hub_type": "standard",
                "status": "active"
            })
        );
        assert_eq!(
            value["metadata"],
            json!({
                "city": "ghent",
                "total_hubs": 1,
                "generated_at": "2026-10-18T06:00:00.000Z",
                "endpoints": ["https://host/api/public/cities/223/hubs/"]
            })
        );
    }

    #[test]
    fn test_array_layout() {
        let writer = HubWriter::new("unused", OutputFormat::Array);
        let rendered = writer.render(&sample_result(vec![sample_hub()])).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();

        let hubs = value.as_array().expect("bare array");
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0]["id"], 7);
        assert_eq!(hubs[0]["longitude"], 3.72);
        assert_eq!(hubs[0]["latitude"], 51.05);
        assert_eq!(hubs[0]["available_bikes"], 4);
    }

    #[test]
    fn test_missing_id_written_as_null() {
        let writer = HubWriter::new("unused", OutputFormat::FeatureCollection);
        let mut hub = sample_hub();
        hub.id = HubId::Missing;
        let rendered = writer.render(&sample_result(vec![hub])).unwrap();
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert!(value["features"][0]["properties"]["id"].is_null());
    }

    #[test]
    fn test_two_space_indent() {
        let writer = HubWriter::new("unused", OutputFormat::FeatureCollection);
        let rendered = writer.render(&sample_result(Vec::new())).unwrap();
        assert!(rendered.starts_with("{\n  \"type\": \"FeatureCollection\""));
    }

    #[test]
    fn test_path_for() {
        let writer = HubWriter::new("hub-data", OutputFormat::FeatureCollection);
        assert_eq!(writer.path_for("ghent"), PathBuf::from("hub-data/hubs-ghent.json"));
    }

    #[test]
    fn test_prepare_creates_nested_dir() {
        let root = scratch_dir("prepare");
        let writer = HubWriter::new(root.join("a/b"), OutputFormat::FeatureCollection);
        writer.prepare().unwrap();
        assert!(writer.dir().is_dir());
        // Second call is a no-op
        writer.prepare().unwrap();
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_prepare_fails_when_path_is_a_file() {
        let root = scratch_dir("prepare-file");
        std::fs::create_dir_all(&root).unwrap();
        let blocker = root.join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let writer = HubWriter::new(&blocker, OutputFormat::FeatureCollection);
        let err = writer.prepare().unwrap_err();
        assert!(matches!(err, WriteError::CreateDir { .. }));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_write_overwrites() {
        let root = scratch_dir("overwrite");
        let writer = HubWriter::new(&root, OutputFormat::Array);
        writer.prepare().unwrap();

        let path = writer.write(&sample_result(vec![sample_hub()])).unwrap();
        assert_eq!(path, root.join("hubs-ghent.json"));
        writer.write(&sample_result(Vec::new())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "[]\n");
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let root = scratch_dir("missing");
        let writer = HubWriter::new(&root, OutputFormat::Array);
        let err = writer.write(&sample_result(Vec::new())).unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
        assert!(err.to_string().contains("hubs-ghent.json"));
    }
}
