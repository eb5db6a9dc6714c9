use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;

/// Versioned media type the `cities/{id}/hubs` endpoints insist on.
pub const ACCEPT_DONKEY_V8: &str = "application/com.donkeyrepublic.v8";

/// Media type for everything else.
pub const ACCEPT_JSON: &str = "application/json";

/// Upstream endpoint family, derived from the URL shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointKind {
    /// `.../cities/{id}/hubs/`
    CityHubs,
    /// `.../nearby?filter_type=account&account_id={id}`
    NearbyAccount { account_id: String },
    Other,
}

impl EndpointKind {
    /// Classify an endpoint URL. Unparsable URLs fall through to `Other`.
    pub fn classify(url: &str) -> Self {
        static RE_CITY_HUBS: OnceLock<Regex> = OnceLock::new();
        let re_city_hubs =
            RE_CITY_HUBS.get_or_init(|| Regex::new(r"/cities/[^/]+/hubs(/|$)").unwrap());

        let Ok(parsed) = Url::parse(url) else {
            return EndpointKind::Other;
        };

        if re_city_hubs.is_match(parsed.path()) {
            return EndpointKind::CityHubs;
        }

        if parsed.path().trim_end_matches('/').ends_with("/nearby") {
            let mut filter_type = None;
            let mut account_id = None;
            for (key, value) in parsed.query_pairs() {
                match key.as_ref() {
                    "filter_type" => filter_type = Some(value.into_owned()),
                    "account_id" => account_id = Some(value.into_owned()),
                    _ => {}
                }
            }
            if filter_type.as_deref() == Some("account") {
                if let Some(account_id) = account_id.filter(|id| !id.is_empty()) {
                    return EndpointKind::NearbyAccount { account_id };
                }
            }
        }

        EndpointKind::Other
    }
}

/// Ordered request header set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestHeaders {
    entries: Vec<(&'static str, String)>,
}

impl RequestHeaders {
    fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.entries.push((name, value.into()));
        self
    }

    /// Value of the first header with this name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(n, v)| (*n, v.as_str()))
    }
}

/// Request headers an endpoint expects, chosen purely from its URL.
///
/// The User-Agent is not part of this set; the HTTP client adds it to
/// every request.
pub fn select_headers(url: &str) -> RequestHeaders {
    match EndpointKind::classify(url) {
        EndpointKind::CityHubs => RequestHeaders::default().with("Accept", ACCEPT_DONKEY_V8),
        EndpointKind::NearbyAccount { account_id } => RequestHeaders::default()
            .with("Accept", ACCEPT_JSON)
            .with("filter_type", "account")
            .with("account_id", account_id),
        EndpointKind::Other => default_headers(),
    }
}

/// Header set for endpoints of unknown shape.
pub fn default_headers() -> RequestHeaders {
    RequestHeaders::default().with("Accept", ACCEPT_JSON)
}
