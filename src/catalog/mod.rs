//! Catalog discovery
//!
//! Fetches the remote NTP server catalog page and parses it into structured
//! server candidates grouped by region and category.

pub mod fetcher;
pub mod parser;

pub use fetcher::CatalogFetcher;
pub use parser::CatalogParser;
