//! Scan orchestration: sequence the pipeline stages over one document.
//!
//! The orchestrator is deliberately thin glue. All decision logic lives in
//! [`crate::pipeline::classify`]; everything here is resolve → render →
//! decode → classify → assemble. Candidates are classified one at a time —
//! verdicts have no ordering dependency on each other, so a future caller
//! could fan them out, but the reputation service sees at most one request
//! in flight per scan.

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::pipeline::{classify::Classifier, decode, input, render, writer};
use crate::record::{DocumentInfo, ScanRecord, ScanReport, ScanStats};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Scan a PDF for QR codes and classify every decoded URL payload.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ScanReport)` on success — including when no QR symbols were found
/// (empty `records`) and when every reputation lookup failed (verdicts with
/// `source = Error`). A single bad or unreachable URL never aborts a scan.
///
/// # Errors
/// Returns `Err(ScanError)` only for fatal conditions: unreadable or corrupt
/// source document, wrong password, or a broken pdfium binding.
pub async fn scan(
    input_str: impl AsRef<str>,
    config: &ScanConfig,
) -> Result<ScanReport, ScanError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting scan: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let pdf_path = input::resolve_input(input_str)?;

    // ── Step 2: Fix the classification strategy for this scan ────────────
    let classifier = Classifier::from_config(config)?;

    // ── Step 3: Rasterise pages ──────────────────────────────────────────
    let render_start = Instant::now();
    let pages = render::render_pages(&pdf_path, config).await?;
    let total_pages = pages.len();
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Rendered {} pages in {}ms", total_pages, render_duration_ms);

    // ── Step 4: Decode QR symbols ────────────────────────────────────────
    let symbols = tokio::task::spawn_blocking(move || decode::decode_pages(pages))
        .await
        .map_err(|e| ScanError::Internal(format!("Decode task panicked: {}", e)))?;
    info!("Found {} QR symbols", symbols.len());

    // ── Step 5: Classify each candidate, sequentially ────────────────────
    let classify_start = Instant::now();
    let mut records = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let verdict = classifier.classify(&symbol.text).await;
        debug!(
            page = symbol.page,
            malicious = verdict.malicious,
            source = %verdict.source,
            "classified candidate"
        );
        records.push(ScanRecord {
            page: symbol.page,
            bounding_box: symbol.bounding_box,
            content: symbol.text,
            verdict,
        });
    }
    let classify_duration_ms = classify_start.elapsed().as_millis() as u64;

    // ── Step 6: Assemble the report ──────────────────────────────────────
    let stats = ScanStats {
        total_pages,
        decoded_symbols: records.len(),
        malicious: records.iter().filter(|r| r.verdict.malicious).count(),
        render_duration_ms,
        classify_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Scan complete: {} symbols on {} pages, {} flagged, {}ms total",
        stats.decoded_symbols, stats.total_pages, stats.malicious, stats.total_duration_ms
    );

    Ok(ScanReport { records, stats })
}

/// Scan a PDF and persist the records directly to a file.
///
/// The output format comes from `config.format`, or is inferred from the
/// output path's extension when unset.
pub async fn scan_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ScanConfig,
) -> Result<ScanStats, ScanError> {
    let report = scan(input_str, config).await?;
    writer::write_records(&report.records, output_path.as_ref(), config.format).await?;
    Ok(report.stats)
}

/// Synchronous wrapper around [`scan`].
///
/// Creates a temporary tokio runtime internally.
pub fn scan_sync(
    input_str: impl AsRef<str>,
    config: &ScanConfig,
) -> Result<ScanReport, ScanError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ScanError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(scan(input_str, config))
}

/// Inspect a PDF's page count and metadata without scanning it.
///
/// Does not require a reputation credential.
pub async fn inspect(input_str: impl AsRef<str>) -> Result<DocumentInfo, ScanError> {
    let pdf_path = input::resolve_input(input_str.as_ref())?;
    render::extract_info(&pdf_path, None).await
}
