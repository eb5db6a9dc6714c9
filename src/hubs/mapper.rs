//! Raw hub object → canonical [`HubRecord`].
//!
//! Upstream endpoints disagree on field names, so every attribute is read
//! through an ordered alias list. The first alias that yields a usable value
//! for the attribute's type wins; `null`, blank strings and non-numeric
//! strings in numeric fields count as missing.

use serde_json::{Map, Value};

use crate::models::{HubId, HubRecord};

/// Location of a field inside a raw hub object.
#[derive(Debug, Clone, Copy)]
pub enum FieldPath {
    Key(&'static str),
    Nested(&'static str, &'static str),
}

use FieldPath::{Key, Nested};

impl FieldPath {
    fn lookup<'a>(&self, hub: &'a Map<String, Value>) -> Option<&'a Value> {
        match *self {
            Key(key) => hub.get(key),
            Nested(outer, inner) => hub.get(outer)?.get(inner),
        }
    }
}

pub const ID: &[FieldPath] = &[Key("id"), Key("hub_id")];
pub const NAME: &[FieldPath] = &[Key("name"), Key("title")];
pub const ADDRESS: &[FieldPath] = &[Key("address"), Key("street_address")];
pub const CITY: &[FieldPath] = &[Key("city")];
pub const LATITUDE: &[FieldPath] = &[
    Key("latitude"),
    Key("lat"),
    Nested("position", "latitude"),
];
pub const LONGITUDE: &[FieldPath] = &[
    Key("longitude"),
    Key("lng"),
    Key("lon"),
    Nested("position", "longitude"),
];
pub const CAPACITY: &[FieldPath] = &[Key("capacity"), Key("bike_capacity")];
pub const AVAILABLE: &[FieldPath] = &[Key("available_bikes"), Key("bikes_available")];
pub const HUB_TYPE: &[FieldPath] = &[Key("hub_type")];
pub const STATUS: &[FieldPath] = &[Key("status")];

const DEFAULT_HUB_TYPE: &str = "standard";
const DEFAULT_STATUS: &str = "active";

/// First alias whose value converts successfully.
pub fn resolve<'a, T>(
    hub: &'a Map<String, Value>,
    paths: &[FieldPath],
    convert: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    paths
        .iter()
        .filter_map(|path| path.lookup(hub))
        .find_map(convert)
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn as_count(value: &Value) -> Option<u32> {
    let n = as_number(value)?;
    if n < 0.0 || n.fract() != 0.0 || n > u32::MAX as f64 {
        return None;
    }
    Some(n as u32)
}

fn as_hub_id(value: &Value) -> Option<HubId> {
    match value {
        Value::Number(n) => Some(HubId::Number(n.clone())),
        Value::String(s) if !s.trim().is_empty() => Some(HubId::Text(s.clone())),
        _ => None,
    }
}

fn as_latitude(value: &Value) -> Option<f64> {
    as_number(value).filter(|lat| (-90.0..=90.0).contains(lat))
}

fn as_longitude(value: &Value) -> Option<f64> {
    as_number(value).filter(|lon| (-180.0..=180.0).contains(lon))
}

/// Map one raw hub object to a [`HubRecord`].
///
/// Returns `None` for non-objects and for hubs without both coordinates.
/// A hub with no usable id is kept under [`HubId::Missing`].
pub fn to_hub_record(raw: &Value, city: &str) -> Option<HubRecord> {
    let hub = raw.as_object()?;

    let latitude = resolve(hub, LATITUDE, as_latitude)?;
    let longitude = resolve(hub, LONGITUDE, as_longitude)?;
    let id = resolve(hub, ID, as_hub_id).unwrap_or(HubId::Missing);

    let name = resolve(hub, NAME, as_text).unwrap_or_else(|| format!("Hub {}", id));

    Some(HubRecord {
        name,
        address: resolve(hub, ADDRESS, as_text).unwrap_or_default(),
        city: resolve(hub, CITY, as_text).unwrap_or_else(|| city.to_string()),
        capacity: resolve(hub, CAPACITY, as_count).unwrap_or(0),
        available: resolve(hub, AVAILABLE, as_count).unwrap_or(0),
        hub_type: resolve(hub, HUB_TYPE, as_text).unwrap_or_else(|| DEFAULT_HUB_TYPE.to_string()),
        status: resolve(hub, STATUS, as_text).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        id,
        longitude,
        latitude,
    })
}
