//! Server registry orchestrator
//!
//! Drives the fetch → parse → probe → rank → group pipeline. Only the fetch
//! stage can fail a run; parse skips and probe failures degrade per item.

pub mod report;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::catalog::{CatalogFetcher, CatalogParser};
use crate::config::Config;
use crate::models::{ProbeResult, Region, ServerCandidate};
use crate::probe::AvailabilityProber;
use crate::utils::error::FetchError;

/// Orchestrator for catalog discovery, probing, ranking, and grouping
pub struct ServerRegistry {
    fetcher: CatalogFetcher,
    parser: CatalogParser,
    prober: AvailabilityProber,
}

impl ServerRegistry {
    /// Create a registry from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let fetcher = CatalogFetcher::with_config(
            &config.catalog.url,
            config.fetch_timeout(),
            config.catalog.max_retries,
        )?;
        let prober = AvailabilityProber::new(config.probe.max_workers, config.probe_timeout());

        Ok(Self::with_parts(fetcher, CatalogParser::new(), prober))
    }

    /// Assemble a registry from already-built components
    pub fn with_parts(
        fetcher: CatalogFetcher,
        parser: CatalogParser,
        prober: AvailabilityProber,
    ) -> Self {
        Self {
            fetcher,
            parser,
            prober,
        }
    }

    /// Fetch the catalog once and parse it into candidates
    ///
    /// # Errors
    ///
    /// Returns the fetch error unchanged; a failed fetch is the only fatal
    /// stage error in the pipeline and is not retried here.
    pub async fn discover(&self) -> Result<Vec<ServerCandidate>, FetchError> {
        let html = self.fetcher.fetch().await.map_err(|e| {
            tracing::error!(url = %self.fetcher.url(), error = %e, "Catalog fetch failed");
            e
        })?;

        let candidates = self.parser.parse(&html);
        tracing::info!(count = candidates.len(), "Discovered server candidates");
        Ok(candidates)
    }

    /// Probe every candidate, collecting results in completion order
    ///
    /// With `show_progress`, one line is printed per completed probe.
    pub async fn test_all(
        &self,
        candidates: Vec<ServerCandidate>,
        show_progress: bool,
        cancel: CancellationToken,
    ) -> Vec<ProbeResult> {
        let total = candidates.len();
        if total == 0 {
            return Vec::new();
        }

        let mut rx: mpsc::Receiver<ProbeResult> = self.prober.probe_all(candidates, cancel);
        let mut results = Vec::with_capacity(total);

        while let Some(result) = rx.recv().await {
            if show_progress {
                println!("{}", report::progress_line(results.len() + 1, total, &result));
            }
            results.push(result);
        }

        let available = results.iter().filter(|r| r.available).count();
        tracing::info!(total, tested = results.len(), available, "Probe batch finished");
        results
    }

    /// The fastest available servers, ascending by latency
    ///
    /// Filters to available results, sorts stably (equal latencies keep
    /// their completion order), and truncates to `top_n`.
    pub fn rank_best(results: &[ProbeResult], top_n: usize) -> Vec<ProbeResult> {
        let mut available: Vec<ProbeResult> =
            results.iter().filter(|r| r.available).cloned().collect();

        available.sort_by(|a, b| {
            let la = a.latency_ms.unwrap_or(f64::INFINITY);
            let lb = b.latency_ms.unwrap_or(f64::INFINITY);
            la.total_cmp(&lb)
        });

        available.truncate(top_n);
        available
    }

    /// Group results by region (Domestic first), then category in insertion
    /// order
    ///
    /// Purely for reporting: includes unavailable results and neither
    /// filters nor ranks.
    pub fn group_by_region_then_category(results: &[ProbeResult]) -> GroupedServers {
        let mut regions = Vec::new();

        for region in Region::all() {
            let mut categories: Vec<CategoryGroup> = Vec::new();

            for result in results.iter().filter(|r| r.region() == region) {
                match categories.iter_mut().find(|c| c.name == result.category()) {
                    Some(group) => group.servers.push(result.clone()),
                    None => categories.push(CategoryGroup {
                        name: result.category().to_string(),
                        servers: vec![result.clone()],
                    }),
                }
            }

            if !categories.is_empty() {
                regions.push(RegionGroup { region, categories });
            }
        }

        GroupedServers { regions }
    }
}

/// Nested region → category → servers view for reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupedServers {
    pub regions: Vec<RegionGroup>,
}

/// One region's grouped servers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionGroup {
    pub region: Region,
    pub categories: Vec<CategoryGroup>,
}

/// One category's servers within a region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub name: String,
    pub servers: Vec<ProbeResult>,
}

impl GroupedServers {
    /// Render the grouped report
    pub fn render(&self) -> String {
        report::render_grouped(self)
    }
}
