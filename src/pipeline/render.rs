//! PDF rasterisation: render every page to a `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto the blocking thread pool
//! so the async runtime is never stalled by CPU-heavy rendering.
//!
//! ## Why cap pixels?
//!
//! Page sizes vary wildly: an A0 poster could rasterise to hundreds of
//! megapixels. `max_rendered_pixels` caps the longest edge regardless of
//! physical size. QR symbols tolerate downscaling well, so the cap costs
//! little detection accuracy while keeping memory bounded.

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::record::DocumentInfo;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Rasterise every page of a PDF into an image.
///
/// Runs inside `spawn_blocking` since pdfium operations are CPU-bound.
///
/// # Returns
/// A vector of `(page_index_0based, DynamicImage)` tuples in page order;
/// empty for a zero-page document.
pub async fn render_pages(
    pdf_path: &Path,
    config: &ScanConfig,
) -> Result<Vec<(usize, DynamicImage)>, ScanError> {
    let path = pdf_path.to_path_buf();
    let max_pixels = config.max_rendered_pixels;
    let password = config.password.clone();

    tokio::task::spawn_blocking(move || {
        render_pages_blocking(&path, max_pixels, password.as_deref())
    })
    .await
    .map_err(|e| ScanError::Internal(format!("Render task panicked: {}", e)))?
}

/// Bind to a pdfium library: `PDFIUM_LIB_PATH` first, then a copy next to
/// the executable, then the system library.
fn bind_pdfium() -> Result<Pdfium, ScanError> {
    if let Ok(dir) = std::env::var("PDFIUM_LIB_PATH") {
        let bindings =
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
                .map_err(|e| ScanError::PdfiumBindingFailed(format!("{e:?}")))?;
        return Ok(Pdfium::new(bindings));
    }

    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| ScanError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Map a pdfium document-open failure onto the error taxonomy.
///
/// pdfium does not distinguish "needs password" from "wrong password" in its
/// error type, so we recover it from the error text plus whether a password
/// was supplied.
fn map_open_error(e: PdfiumError, pdf_path: &Path, password: Option<&str>) -> ScanError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            ScanError::WrongPassword {
                path: pdf_path.to_path_buf(),
            }
        } else {
            ScanError::PasswordRequired {
                path: pdf_path.to_path_buf(),
            }
        }
    } else {
        ScanError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: err_str,
        }
    }
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(
    pdf_path: &Path,
    max_pixels: u32,
    password: Option<&str>,
) -> Result<Vec<(usize, DynamicImage)>, ScanError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| map_open_error(e, pdf_path, password))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .set_target_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut results = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| ScanError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );

        results.push((idx, image));
    }

    Ok(results)
}

/// Extract document facts from a PDF without rendering pages.
pub async fn extract_info(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentInfo, ScanError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_info_blocking(&path, pwd.as_deref()))
        .await
        .map_err(|e| ScanError::Internal(format!("Inspect task panicked: {}", e)))?
}

/// Blocking implementation of document inspection.
fn extract_info_blocking(pdf_path: &Path, password: Option<&str>) -> Result<DocumentInfo, ScanError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| map_open_error(e, pdf_path, password))?;

    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(DocumentInfo {
        page_count: pages.len() as usize,
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        pdf_version: format!("{:?}", document.version()),
    })
}
