//! Result types produced by a scan.
//!
//! Everything here is a plain owned value: a [`ScanRecord`] owns its payload
//! string and its [`Verdict`], and nothing is shared or mutated after the
//! orchestrator assembles it. That makes records trivially serialisable and
//! safe to hand to the writer, a channel, or a parallel collector without
//! further coordination.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned bounding box of a decoded QR symbol, in pixel coordinates of
/// the rendered page.
///
/// Computed as the hull of the four detected corner points, so a rotated
/// symbol still gets a sensible upright box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// Build the axis-aligned hull of a set of corner points.
    ///
    /// Returns a zero-sized box at the origin for an empty slice; decoders
    /// always supply four corners so that case never occurs in practice.
    pub fn from_corners(points: &[(i32, i32)]) -> Self {
        let min_x = points.iter().map(|p| p.0).min().unwrap_or(0);
        let max_x = points.iter().map(|p| p.0).max().unwrap_or(0);
        let min_y = points.iter().map(|p| p.1).min().unwrap_or(0);
        let max_y = points.iter().map(|p| p.1).max().unwrap_or(0);
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Whether the point lies inside the box (inclusive edges).
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Which mechanism produced a [`Verdict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictSource {
    /// Local offline rule scoring; used when no reputation credential is set.
    #[serde(rename = "heuristic")]
    Heuristic,
    /// VirusTotal URL reputation lookup.
    #[serde(rename = "virustotal")]
    Reputation,
    /// The reputation lookup failed; the verdict defaults to not-malicious.
    #[serde(rename = "error")]
    Error,
}

impl fmt::Display for VerdictSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerdictSource::Heuristic => write!(f, "heuristic"),
            VerdictSource::Reputation => write!(f, "virustotal"),
            VerdictSource::Error => write!(f, "error"),
        }
    }
}

/// The malicious/benign determination for one candidate URL.
///
/// Immutable once produced; exactly one verdict exists per candidate per scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub malicious: bool,
    pub source: VerdictSource,
}

impl Verdict {
    pub fn heuristic(malicious: bool) -> Self {
        Self {
            malicious,
            source: VerdictSource::Heuristic,
        }
    }

    pub fn reputation(malicious: bool) -> Self {
        Self {
            malicious,
            source: VerdictSource::Reputation,
        }
    }

    /// The fail-open verdict used when a reputation lookup cannot complete.
    pub fn lookup_failed() -> Self {
        Self {
            malicious: false,
            source: VerdictSource::Error,
        }
    }
}

/// One decoded QR symbol together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Page the symbol was found on (1-indexed).
    pub page: usize,
    /// Location of the symbol on the rendered page.
    #[serde(rename = "bbox")]
    pub bounding_box: BoundingBox,
    /// Raw decoded payload — usually a URL, but never validated as one.
    #[serde(rename = "qr_content")]
    pub content: String,
    /// Classification of the payload.
    #[serde(flatten)]
    pub verdict: Verdict,
}

/// Aggregate counters and timings for one scan run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// QR symbols successfully decoded across all pages.
    pub decoded_symbols: usize,
    /// Records whose verdict came back malicious.
    pub malicious: usize,
    /// Wall-clock time spent rasterising pages.
    pub render_duration_ms: u64,
    /// Wall-clock time spent classifying candidates (includes network time
    /// on the reputation path).
    pub classify_duration_ms: u64,
    /// End-to-end wall-clock time.
    pub total_duration_ms: u64,
}

/// The complete result of scanning one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// One record per decoded QR symbol, in page order.
    pub records: Vec<ScanRecord>,
    pub stats: ScanStats,
}

impl ScanReport {
    /// Records whose verdict flagged the payload as malicious.
    pub fn malicious_records(&self) -> impl Iterator<Item = &ScanRecord> {
        self.records.iter().filter(|r| r.verdict.malicious)
    }
}

/// Document facts obtainable without running a scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub producer: Option<String>,
    pub pdf_version: String,
}
