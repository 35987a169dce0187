//! Error types for the qrscan library.
//!
//! Only *fatal* conditions live here — an unreadable document, an unsupported
//! output format, a broken pdfium binding. Per-candidate problems never become
//! errors: a reputation lookup that times out yields a
//! [`crate::record::Verdict`] with `source = Error`, and an unparsable payload
//! yields a fail-closed `malicious = true` verdict. A scan therefore never
//! aborts mid-way because one URL was bad or one service was unreachable.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the qrscan library.
#[derive(Debug, Error)]
pub enum ScanError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The requested output format is not `json` or `sqlite`.
    ///
    /// This is the only error class a caller of the writer must let escape.
    #[error("Unsupported output format: '{format}'\nSupported formats: json, sqlite")]
    UnsupportedFormat { format: String },

    /// Could not create or write the results file.
    #[error("Failed to write results to '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sqlite backend rejected the write.
    #[error("Failed to write results to sqlite database '{path}': {detail}")]
    DatabaseWriteFailed { path: PathBuf, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy,\n\
or install pdfium from https://github.com/bblanchon/pdfium-binaries.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
