//! Catalog page parser
//!
//! Extracts server candidates from the catalog HTML with a boundary-scanning
//! walk: each region listing starts at a named anchor and runs through the
//! following sibling elements until the next region anchor or the end of the
//! document. Category blocks inside the walk set the current category for
//! every address input that follows them.
//!
//! Parsing never fails. Malformed fragments and non-address decorative
//! tokens are skipped, a missing anchor just contributes zero candidates.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};

use crate::models::{Region, ServerCandidate};

// Helper macro to parse selectors safely at startup
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    /// Start of the domestic server listing
    static ref DOMESTIC_ANCHOR: Selector = parse_selector!(r#"a[name="china"]"#);

    /// Start of the overseas server listing
    static ref OVERSEAS_ANCHOR: Selector = parse_selector!(r#"a[name="global"]"#);

    /// Leading bold text inside a category block
    static ref CATEGORY_TITLE: Selector = parse_selector!("b");

    /// Server address inputs inside a category block
    static ref ADDRESS_INPUT: Selector = parse_selector!("input.ips");
}

/// Catalog HTML parser
#[derive(Debug, Default)]
pub struct CatalogParser;

impl CatalogParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse catalog markup into candidates in document order
    ///
    /// Each candidate is tagged with the region whose anchor it was found
    /// under and the nearest preceding category header within that region.
    pub fn parse(&self, html: &str) -> Vec<ServerCandidate> {
        let document = Html::parse_document(html);
        let mut candidates = Vec::new();

        if let Some(anchor) = document.select(&DOMESTIC_ANCHOR).next() {
            candidates.extend(self.scan_region(anchor, Region::Domestic));
        }

        if let Some(anchor) = document.select(&OVERSEAS_ANCHOR).next() {
            candidates.extend(self.scan_region(anchor, Region::Overseas));
        }

        tracing::debug!(count = candidates.len(), "Catalog parsed");
        candidates
    }

    /// Walk one region's sibling elements, collecting candidates
    fn scan_region(&self, anchor: ElementRef<'_>, region: Region) -> Vec<ServerCandidate> {
        let mut candidates = Vec::new();
        let mut current_category = String::new();

        for sibling in anchor.next_siblings().filter_map(ElementRef::wrap) {
            // The other region's anchor ends this walk
            if is_region_anchor(&sibling) {
                break;
            }

            if !is_category_block(&sibling) {
                continue;
            }

            if let Some(title) = sibling.select(&CATEGORY_TITLE).next() {
                if let Some(name) = category_name(title) {
                    current_category = name;
                }
            }

            for input in sibling.select(&ADDRESS_INPUT) {
                let value = input.value().attr("value").unwrap_or("").trim();

                if is_valid_server_address(value) {
                    candidates.push(ServerCandidate::new(value, &current_category, region));
                }
            }
        }

        tracing::debug!(region = %region, count = candidates.len(), "Region scanned");
        candidates
    }
}

/// Whether an element is one of the region anchors delimiting the listings
fn is_region_anchor(element: &ElementRef<'_>) -> bool {
    element.value().name() == "a"
        && matches!(element.value().attr("name"), Some("china") | Some("global"))
}

/// Whether an element is a category block carrying address inputs
fn is_category_block(element: &ElementRef<'_>) -> bool {
    element.value().name() == "div" && element.value().classes().any(|c| c == "box_shadow")
}

/// Category name from a block title
///
/// The page stacks a Chinese and an English name in one `<b>` separated by
/// `<br>`; only the first text line is the category.
fn category_name(title: ElementRef<'_>) -> Option<String> {
    title
        .text()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

/// Validate an extracted address token
///
/// Rejects empty values, the literal placeholder "None", and tokens that
/// contain neither `.` nor `:` (decorative text, not a hostname or IP).
pub fn is_valid_server_address(address: &str) -> bool {
    if address.is_empty() || address == "None" {
        return false;
    }

    address.contains('.') || address.contains(':')
}
