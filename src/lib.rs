//! # qrscan
//!
//! Scan PDF documents for embedded QR codes and triage their URL payloads.
//!
//! ## Why this crate?
//!
//! QR codes pasted into invoices, parking tickets, and "please verify your
//! account" letters are a common phishing vector — the reader cannot see the
//! link before following it. This crate rasterises each page, decodes any QR
//! symbol it finds, and classifies the payload as safe or suspicious before
//! a human ever points a phone at it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate the path and PDF magic bytes
//!  ├─ 2. Render    rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Decode    locate and decode QR symbols (rqrr)
//!  ├─ 4. Classify  verdict per URL — VirusTotal lookup or local heuristics
//!  └─ 5. Persist   records as JSON or a sqlite table
//! ```
//!
//! ## Classification policy
//!
//! The strategy is fixed once per scan: with a VirusTotal API key configured
//! every candidate goes to the reputation service (failures are recorded on
//! the verdict as `source = "error"`, never raised); without one, a pure
//! offline heuristic scores denylisted TLDs, raw IP hosts, phishing keywords,
//! percent-encoding and excessive length. See [`pipeline::classify`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qrscan::{scan, ScanConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Heuristic classification; set a key for VirusTotal lookups.
//!     let config = ScanConfig::default();
//!     let report = scan("invoice.pdf", &config).await?;
//!     for record in &report.records {
//!         println!(
//!             "page {}: {} — malicious: {} ({})",
//!             record.page, record.content, record.verdict.malicious, record.verdict.source
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `qrscan` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! qrscan = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod scan;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{OutputFormat, ScanConfig, ScanConfigBuilder, DEFAULT_REPUTATION_ENDPOINT};
pub use error::ScanError;
pub use pipeline::classify::{is_suspicious, Classifier};
pub use record::{
    BoundingBox, DocumentInfo, ScanRecord, ScanReport, ScanStats, Verdict, VerdictSource,
};
pub use scan::{inspect, scan, scan_sync, scan_to_file};
