use std::sync::OnceLock;

use crate::models::City;

/// Embedded default city registry (compiled into the binary).
const CITY_REGISTRY_JSON: &str = include_str!("../../assets/cities.json");

static CITY_REGISTRY: OnceLock<Vec<City>> = OnceLock::new();

fn get_registry() -> &'static [City] {
    CITY_REGISTRY.get_or_init(|| {
        serde_json::from_str(CITY_REGISTRY_JSON).expect("embedded city registry is valid JSON")
    })
}

/// The built-in cities, in processing order.
pub fn default_cities() -> Vec<City> {
    get_registry().to_vec()
}
