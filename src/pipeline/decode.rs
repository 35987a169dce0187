//! QR symbol detection and decoding on rendered page images.
//!
//! Detection runs on a grayscale copy of the page — QR finder patterns are
//! pure luminance structure, and `rqrr` operates on 8-bit gray buffers.
//! At most one symbol is reported per page: the first grid that decodes to a
//! non-empty payload. Undecodable grids (damaged symbols, false-positive
//! finder patterns) are skipped silently; a page with no symbol simply
//! contributes nothing.

use crate::record::BoundingBox;
use image::DynamicImage;
use tracing::{debug, trace};

/// A decoded QR symbol located on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSymbol {
    /// Page the symbol was found on (1-indexed).
    pub page: usize,
    /// Raw decoded payload.
    pub text: String,
    /// Axis-aligned hull of the symbol's four corner points.
    pub bounding_box: BoundingBox,
}

/// Detect and decode QR symbols across a set of rendered pages.
///
/// CPU-bound and infallible: pages without a readable symbol are skipped,
/// never reported as errors. Results keep page order.
pub fn decode_pages(pages: Vec<(usize, DynamicImage)>) -> Vec<DecodedSymbol> {
    let mut symbols = Vec::new();

    for (idx, img) in pages {
        let page = idx + 1;
        match decode_page(&img) {
            Some((text, bounding_box)) => {
                debug!("Page {}: decoded QR symbol ({} bytes)", page, text.len());
                symbols.push(DecodedSymbol {
                    page,
                    text,
                    bounding_box,
                });
            }
            None => trace!("Page {}: no QR symbol", page),
        }
    }

    symbols
}

/// Decode the first readable, non-empty QR symbol on one page image.
fn decode_page(img: &DynamicImage) -> Option<(String, BoundingBox)> {
    let gray = img.to_luma8();
    let (w, h) = gray.dimensions();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
        gray.get_pixel(x as u32, y as u32)[0]
    });

    for grid in prepared.detect_grids() {
        match grid.decode() {
            Ok((_meta, content)) if !content.is_empty() => {
                let corners: Vec<(i32, i32)> =
                    grid.bounds.iter().map(|p| (p.x, p.y)).collect();
                return Some((content, BoundingBox::from_corners(&corners)));
            }
            Ok(_) => trace!("skipping empty QR payload"),
            Err(e) => trace!("undecodable grid: {:?}", e),
        }
    }

    None
}
