use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A city and the upstream endpoints its hubs are collected from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct City {
    pub name: String,
    pub endpoints: Vec<String>,
}

#[cfg(test)]
impl City {
    pub fn new(name: &str, endpoints: &[&str]) -> Self {
        City {
            name: name.to_string(),
            endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Hub identifier as delivered upstream.
///
/// Numeric and textual ids are kept apart: `7` and `"7"` are different hubs,
/// and each serializes back in its original JSON type. Hubs without any id
/// share the `Missing` key and serialize it as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum HubId {
    Number(serde_json::Number),
    Text(String),
    Missing,
}

impl std::fmt::Display for HubId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubId::Number(n) => write!(f, "{}", n),
            HubId::Text(s) => write!(f, "{}", s),
            HubId::Missing => Ok(()),
        }
    }
}

/// Canonical hub record, independent of the upstream response shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HubRecord {
    pub id: HubId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub capacity: u32,
    #[serde(rename = "available_bikes")]
    pub available: u32,
    pub hub_type: String,
    pub status: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Everything collected for one city during a run.
#[derive(Debug, Clone)]
pub struct CityResult {
    pub city: String,
    /// Unique by id, in first-seen order.
    pub hubs: Vec<HubRecord>,
    pub endpoints: Vec<String>,
    pub failed_endpoints: usize,
    pub generated_at: DateTime<Utc>,
}

impl CityResult {
    /// ISO-8601 timestamp with millisecond precision, e.g. `2026-10-18T09:30:00.000Z`.
    pub fn generated_at_iso(&self) -> String {
        self.generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
