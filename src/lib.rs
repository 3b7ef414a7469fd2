//! ntpscout - NTP server catalog discovery and latency ranking
//!
//! Discovers NTP server candidates from a remote catalog page, probes each
//! one concurrently for TCP reachability on port 123, and produces a ranked
//! "best servers" view plus a grouped report.
//!
//! # Architecture
//!
//! - [`config`] - Configuration management and settings
//! - [`catalog`] - Catalog page fetching and parsing
//! - [`probe`] - Concurrent reachability probing
//! - [`registry`] - Pipeline orchestration, ranking, and grouping
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use ntpscout::config::Config;
//! use ntpscout::registry::ServerRegistry;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let registry = ServerRegistry::new(&config)?;
//!
//!     let candidates = registry.discover().await?;
//!     let results = registry
//!         .test_all(candidates, true, CancellationToken::new())
//!         .await;
//!
//!     for best in ServerRegistry::rank_best(&results, config.probe.top_n) {
//!         println!("{}", best.name());
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod models;
pub mod probe;
pub mod registry;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{CatalogFetcher, CatalogParser};
    pub use crate::config::Config;
    pub use crate::models::{ProbeResult, Region, ServerCandidate};
    pub use crate::probe::AvailabilityProber;
    pub use crate::registry::{GroupedServers, ServerRegistry};
    pub use crate::utils::error::FetchError;
}

// Direct re-exports for convenience
pub use models::{ProbeResult, Region, ServerCandidate};
