//! CLI binary for qrscan.
//!
//! A thin shim over the library crate that maps CLI flags to `ScanConfig`
//! and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use qrscan::{inspect, scan, scan_to_file, OutputFormat, ScanConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Scan with offline heuristics, JSON records to stdout
  qrscan invoice.pdf

  # Persist results to a file (format inferred from the extension)
  qrscan invoice.pdf -o results.json
  qrscan invoice.pdf -o results.sqlite

  # Check every URL against VirusTotal instead of the heuristics
  VIRUSTOTAL_API_KEY=... qrscan invoice.pdf -o results.json

  # Encrypted document
  qrscan --password hunter2 statement.pdf

  # Page count and metadata only, no scan
  qrscan --inspect-only invoice.pdf

ENVIRONMENT VARIABLES:
  VIRUSTOTAL_API_KEY   Reputation-service credential; enables lookups
  PDFIUM_LIB_PATH      Directory containing libpdfium — skips system lookup

CLASSIFICATION:
  With an API key each URL is submitted to the VirusTotal URL endpoint; a
  failed lookup is recorded on the verdict as source "error" and never
  aborts the scan. Without a key a local heuristic flags denylisted TLDs,
  raw IP hosts, phishing keywords, heavy percent-encoding, and very long
  URLs. The two paths are exclusive.
"#;

/// Scan PDF documents for QR codes and triage their URL payloads.
#[derive(Parser, Debug)]
#[command(
    name = "qrscan",
    version,
    about = "Scan PDF documents for QR codes and triage their URL payloads",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: String,

    /// Write records to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: json or sqlite. Inferred from the extension when unset.
    #[arg(long)]
    format: Option<String>,

    /// VirusTotal API key; enables reputation lookups.
    #[arg(long, env = "VIRUSTOTAL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-lookup timeout in seconds.
    #[arg(long, default_value_t = 10)]
    api_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long)]
    password: Option<String>,

    /// Maximum rendered page dimension in pixels.
    #[arg(long, default_value_t = 2000)]
    max_pixels: u32,

    /// Print page count and metadata only, no scan.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and records.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect(&cli.input).await.context("Failed to inspect PDF")?;
        println!("File:         {}", cli.input);
        if let Some(ref t) = info.title {
            println!("Title:        {}", t);
        }
        if let Some(ref a) = info.author {
            println!("Author:       {}", a);
        }
        if let Some(ref p) = info.producer {
            println!("Producer:     {}", p);
        }
        println!("Pages:        {}", info.page_count);
        println!("PDF Version:  {}", info.pdf_version);
        return Ok(());
    }

    let config = build_config(&cli)?;

    // ── Run scan ─────────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = scan_to_file(&cli.input, output_path, &config)
            .await
            .context("Scan failed")?;

        if !cli.quiet {
            eprintln!(
                "{} symbols on {} pages ({} flagged)  {}ms  →  {}",
                stats.decoded_symbols,
                stats.total_pages,
                stats.malicious,
                stats.total_duration_ms,
                output_path.display(),
            );
        }
    } else {
        let report = scan(&cli.input, &config).await.context("Scan failed")?;

        let json = serde_json::to_string_pretty(&report.records)
            .context("Failed to serialise records")?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .and_then(|_| handle.write_all(b"\n"))
            .context("Failed to write to stdout")?;

        if !cli.quiet {
            eprintln!(
                "{} symbols on {} pages ({} flagged) in {}ms",
                report.stats.decoded_symbols,
                report.stats.total_pages,
                report.stats.malicious,
                report.stats.total_duration_ms,
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ScanConfig`.
fn build_config(cli: &Cli) -> Result<ScanConfig> {
    let mut builder = ScanConfig::builder()
        .api_timeout_secs(cli.api_timeout)
        .max_rendered_pixels(cli.max_pixels);

    if let Some(ref key) = cli.api_key {
        builder = builder.reputation_api_key(key);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref fmt) = cli.format {
        // An unknown explicit format is the one hard persistence failure;
        // surface it before any rendering work happens.
        builder = builder.format(OutputFormat::parse(fmt)?);
    }

    builder.build().context("Invalid configuration")
}
