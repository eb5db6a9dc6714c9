use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::donkey::client::{FetchError, HubClient, Transport};
use crate::hubs::dedupe::dedupe;
use crate::hubs::mapper::to_hub_record;
use crate::hubs::shape::normalize;
use crate::models::{City, CityResult, HubRecord};
use crate::output::{HubWriter, WriteError};

/// Counters for one full pass over the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cities: usize,
    pub files_written: usize,
    pub total_hubs: usize,
    pub failed_endpoints: usize,
    pub failed_writes: usize,
}

/// Sequential fetch → normalize → map → dedupe → write pass.
///
/// One request is outstanding at any time: cities run in registry order and
/// endpoints within a city in declared order. Nothing is carried from one
/// city to the next.
pub struct Pipeline<T: Transport> {
    client: HubClient<T>,
    writer: HubWriter,
    city_delay: Duration,
}

impl<T: Transport> Pipeline<T> {
    pub fn new(client: HubClient<T>, writer: HubWriter, city_delay: Duration) -> Self {
        Pipeline {
            client,
            writer,
            city_delay,
        }
    }

    /// Process every city.
    ///
    /// Endpoint and per-city write failures are logged and counted. The only
    /// error returned is failing to create the output directory.
    pub async fn run(&self, cities: &[City]) -> Result<RunSummary, WriteError> {
        self.writer.prepare()?;
        info!(
            "[RUN] Processing {} cities into {}",
            cities.len(),
            self.writer.dir().display()
        );

        let mut summary = RunSummary::default();

        for (i, city) in cities.iter().enumerate() {
            // Pause between cities to stay under the API's implicit rate limit
            if i > 0 && !self.city_delay.is_zero() {
                tokio::time::sleep(self.city_delay).await;
            }

            let result = self.collect_city(city).await;
            summary.cities += 1;
            summary.failed_endpoints += result.failed_endpoints;

            match self.writer.write(&result) {
                Ok(path) => {
                    info!(
                        "[WRITE] Saved {} unique hubs to {}",
                        result.hubs.len(),
                        path.display()
                    );
                    summary.files_written += 1;
                    summary.total_hubs += result.hubs.len();
                }
                Err(e) => {
                    warn!("[WRITE] {}: {}", city.name, e);
                    summary.failed_writes += 1;
                }
            }
        }

        info!(
            "[RUN] Processing complete: {} hubs across {} files ({} endpoint errors, {} write errors)",
            summary.total_hubs,
            summary.files_written,
            summary.failed_endpoints,
            summary.failed_writes
        );
        Ok(summary)
    }

    /// Fetch all endpoints of one city and merge their hubs.
    ///
    /// A city whose endpoints all fail still yields a (possibly empty) result.
    pub async fn collect_city(&self, city: &City) -> CityResult {
        info!("[FETCH] Processing {}...", city.name);

        let mut hubs = Vec::new();
        let mut failed_endpoints = 0;

        for endpoint in &city.endpoints {
            match self.fetch_endpoint(endpoint, &city.name).await {
                Ok(found) => {
                    info!("[FETCH]   Found {} hubs from {}", found.len(), endpoint);
                    hubs.extend(found);
                }
                Err(e) => {
                    warn!("[FETCH]   Error with {}: {}", endpoint, e);
                    failed_endpoints += 1;
                }
            }
        }

        if failed_endpoints > 0 && failed_endpoints == city.endpoints.len() {
            warn!("[FETCH] All endpoints failed for {}", city.name);
        }

        CityResult {
            city: city.name.clone(),
            hubs: dedupe(hubs),
            endpoints: city.endpoints.clone(),
            failed_endpoints,
            generated_at: Utc::now(),
        }
    }

    async fn fetch_endpoint(&self, url: &str, city: &str) -> Result<Vec<HubRecord>, FetchError> {
        let payload = self.client.fetch(url).await?;
        let records = normalize(payload, url);
        let total = records.len();

        let hubs: Vec<HubRecord> = records
            .iter()
            .filter_map(|raw| to_hub_record(raw, city))
            .collect();

        if hubs.len() < total {
            debug!(
                "[FETCH]   Skipped {} of {} records from {} (no coordinates)",
                total - hubs.len(),
                total,
                url
            );
        }
        Ok(hubs)
    }
}
