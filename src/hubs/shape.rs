use serde_json::Value;
use tracing::{debug, warn};

/// Top-level shape of an endpoint response.
///
/// Wrapper keys are tried in this order; the first one holding an array wins.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Array(Vec<Value>),
    WrappedHubs(Vec<Value>),
    WrappedData(Vec<Value>),
    WrappedResults(Vec<Value>),
    WrappedStations(Vec<Value>),
    Unrecognized,
}

impl Payload {
    pub fn classify(raw: Value) -> Self {
        let mut object = match raw {
            Value::Array(items) => return Payload::Array(items),
            Value::Object(object) => object,
            _ => return Payload::Unrecognized,
        };

        let wrappers: [(&str, fn(Vec<Value>) -> Payload); 4] = [
            ("hubs", Payload::WrappedHubs),
            ("data", Payload::WrappedData),
            ("results", Payload::WrappedResults),
            ("stations", Payload::WrappedStations),
        ];

        for (key, wrap) in wrappers {
            if let Some(Value::Array(_)) = object.get(key) {
                if let Some(Value::Array(items)) = object.remove(key) {
                    return wrap(items);
                }
            }
        }

        Payload::Unrecognized
    }

    /// Short label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Payload::Array(_) => "array",
            Payload::WrappedHubs(_) => "hubs",
            Payload::WrappedData(_) => "data",
            Payload::WrappedResults(_) => "results",
            Payload::WrappedStations(_) => "stations",
            Payload::Unrecognized => "unrecognized",
        }
    }

    pub fn into_records(self) -> Vec<Value> {
        match self {
            Payload::Array(items)
            | Payload::WrappedHubs(items)
            | Payload::WrappedData(items)
            | Payload::WrappedResults(items)
            | Payload::WrappedStations(items) => items,
            Payload::Unrecognized => Vec::new(),
        }
    }
}

/// Extract the raw hub objects from any supported payload shape.
///
/// An unrecognized shape is only a warning: it yields no records. `source`
/// names the endpoint in log lines.
pub fn normalize(raw: Value, source: &str) -> Vec<Value> {
    let payload = Payload::classify(raw);
    match payload {
        Payload::Unrecognized => {
            warn!("[SHAPE] Unexpected data format from {}, taking no hubs", source)
        }
        _ => debug!("[SHAPE] {} payload from {}", payload.label(), source),
    }
    payload.into_records()
}
