// Core data structures for ntpscout

use serde::{Deserialize, Serialize};

/// Region of the catalog a server was listed under
///
/// The catalog page splits its listing into a domestic (国内) and an
/// overseas (海外) section, delimited by named anchors. The region is fixed
/// when a candidate is parsed and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Domestic,
    Overseas,
}

impl Region {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domestic => "domestic",
            Self::Overseas => "overseas",
        }
    }

    /// Get Chinese display name used by the catalog page and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Domestic => "国内",
            Self::Overseas => "海外",
        }
    }

    /// Create from string (supports English names, anchor names, and Chinese labels)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "domestic" | "china" | "国内" => Some(Self::Domestic),
            "overseas" | "global" | "海外" => Some(Self::Overseas),
            _ => None,
        }
    }

    /// All regions in report order (Domestic first)
    pub fn all() -> [Self; 2] {
        [Self::Domestic, Self::Overseas]
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A parsed, unverified server entry from the catalog page
///
/// Created once during parsing and never mutated; the probing stage produces
/// a new [`ProbeResult`] value instead of writing back into the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCandidate {
    /// Hostname or IP-literal token, never empty (validated at parse time)
    pub name: String,

    /// Nearest preceding category header; empty if none was seen yet
    pub category: String,

    /// Catalog section the candidate was found under
    pub region: Region,
}

impl ServerCandidate {
    pub fn new(name: impl Into<String>, category: impl Into<String>, region: Region) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            region,
        }
    }
}

/// Outcome of a single reachability probe
///
/// Carries its originating candidate by value so completion-order result
/// streams never need an external index to re-associate results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The candidate this probe tested
    pub candidate: ServerCandidate,

    /// First resolved address; empty when resolution failed
    pub resolved_addr: String,

    /// Round-trip time of the connect attempt in milliseconds
    ///
    /// `None` when the hostname did not resolve. Connect-stage failures keep
    /// their measured elapsed time for observability; ranking only ever
    /// considers available results.
    pub latency_ms: Option<f64>,

    /// Whether the TCP connect to port 123 succeeded
    pub available: bool,
}

impl ProbeResult {
    /// Result for a candidate whose hostname could not be resolved
    pub fn unreachable(candidate: ServerCandidate) -> Self {
        Self {
            candidate,
            resolved_addr: String::new(),
            latency_ms: None,
            available: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.candidate.name
    }

    pub fn category(&self) -> &str {
        &self.candidate.category
    }

    pub fn region(&self) -> Region {
        self.candidate.region
    }
}
