//! Input resolution: validate the user-supplied PDF path before handing it
//! to pdfium.
//!
//! Checking the `%PDF` magic bytes up front means callers get a precise
//! [`ScanError::NotAPdf`] instead of an opaque pdfium parse failure when
//! someone points the scanner at a ZIP or a Word document.

use crate::error::ScanError;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// Resolve a local file path, validating existence and PDF magic bytes.
pub fn resolve_input(path_str: &str) -> Result<PathBuf, ScanError> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(ScanError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(ScanError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ScanError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(ScanError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_input("/definitely/not/a/real/file.pdf").unwrap_err();
        assert!(matches!(err, ScanError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_magic_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"PK\x03\x04 definitely a zip").unwrap();
        let err = resolve_input(f.path().to_str().unwrap()).unwrap_err();
        match err {
            ScanError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn pdf_magic_accepted() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n%stub").unwrap();
        let path = resolve_input(f.path().to_str().unwrap()).unwrap();
        assert_eq!(path, f.path());
    }

    #[test]
    fn short_file_passes_magic_check() {
        // Fewer than 4 bytes: the magic read fails, so validation is left to
        // pdfium, which reports CorruptPdf.
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%P").unwrap();
        assert!(resolve_input(f.path().to_str().unwrap()).is_ok());
    }
}
