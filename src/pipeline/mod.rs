//! Pipeline stages for PDF QR triage.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap an
//! implementation (e.g. the rendering backend or the QR decoder) without
//! touching the other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ decode ──▶ classify ──▶ writer
//! (path)    (pdfium)   (rqrr)     (verdict)    (json/sqlite)
//! ```
//!
//! 1. [`input`]    — validate the PDF path and magic bytes
//! 2. [`render`]   — rasterise every page; runs in `spawn_blocking` because
//!    pdfium is not async-safe
//! 3. [`decode`]   — locate and decode at most one QR symbol per page
//! 4. [`classify`] — produce a verdict per candidate URL; the only stage
//!    with network I/O, and only when a reputation credential is configured
//! 5. [`writer`]   — persist records as JSON or sqlite

pub mod classify;
pub mod decode;
pub mod input;
pub mod render;
pub mod writer;
