//! Configuration types for a QR scan.
//!
//! All scan behaviour is controlled through [`ScanConfig`], built via its
//! [`ScanConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across calls, log them, and diff two runs to understand
//! why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A positional constructor breaks on every new field. The builder lets
//! callers set only what they care about and rely on documented defaults.

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default reputation-service endpoint (VirusTotal URL analysis, API v3).
pub const DEFAULT_REPUTATION_ENDPOINT: &str = "https://www.virustotal.com/api/v3/urls";

/// How scan records are persisted by [`crate::scan_to_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Pretty-printed JSON array of records.
    Json,
    /// Sqlite database with a single `qr_scan_results` table.
    Sqlite,
}

impl OutputFormat {
    /// Parse an explicit format name.
    ///
    /// Anything other than `json` or `sqlite` is the one hard failure the
    /// persistence layer is allowed to raise.
    pub fn parse(s: &str) -> Result<Self, ScanError> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "sqlite" | "db" => Ok(OutputFormat::Sqlite),
            other => Err(ScanError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }

    /// Infer the format from the output path's extension.
    ///
    /// `.sqlite` and `.db` select sqlite; everything else (including no
    /// extension at all) falls back to JSON.
    pub fn infer(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("sqlite") | Some("db") => OutputFormat::Sqlite,
            _ => OutputFormat::Json,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Configuration for a PDF QR scan.
///
/// Built via [`ScanConfig::builder()`] or [`ScanConfig::default()`].
///
/// # Example
/// ```rust
/// use qrscan::ScanConfig;
///
/// let config = ScanConfig::builder()
///     .max_rendered_pixels(1500)
///     .api_timeout_secs(5)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// VirusTotal API key. When set, every candidate URL is checked against
    /// the reputation service; when absent, the local heuristic is used.
    /// The two paths are exclusive — never both.
    pub reputation_api_key: Option<String>,

    /// Reputation-service endpoint. Default: [`DEFAULT_REPUTATION_ENDPOINT`].
    ///
    /// Overridable so tests can point the classifier at a local stub instead
    /// of the live service.
    pub reputation_endpoint: String,

    /// Per-lookup timeout in seconds. Default: 10.
    ///
    /// A lookup that exceeds this is abandoned and recorded as a failed
    /// lookup on the verdict; it is never retried.
    pub api_timeout_secs: u64,

    /// Maximum rendered page dimension (width or height) in pixels. Default: 2000.
    ///
    /// A safety cap: an A0 poster page could otherwise rasterise to a
    /// buffer of hundreds of megapixels. QR symbols survive downscaling
    /// well, so capping the long edge costs little detection accuracy.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Output format for [`crate::scan_to_file`]. `None` means infer from
    /// the output path's extension.
    pub format: Option<OutputFormat>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            reputation_api_key: None,
            reputation_endpoint: DEFAULT_REPUTATION_ENDPOINT.to_string(),
            api_timeout_secs: 10,
            max_rendered_pixels: 2000,
            password: None,
            format: None,
        }
    }
}

impl ScanConfig {
    /// Create a new builder for `ScanConfig`.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ScanConfig`].
#[derive(Debug)]
pub struct ScanConfigBuilder {
    config: ScanConfig,
}

impl ScanConfigBuilder {
    pub fn reputation_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.reputation_api_key = Some(key.into());
        self
    }

    pub fn reputation_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.reputation_endpoint = endpoint.into();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = Some(format);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ScanConfig, ScanError> {
        let c = &self.config;
        if c.api_timeout_secs == 0 {
            return Err(ScanError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if c.reputation_endpoint.is_empty() {
            return Err(ScanError::InvalidConfig(
                "Reputation endpoint must not be empty".into(),
            ));
        }
        if let Some(ref key) = c.reputation_api_key {
            if key.trim().is_empty() {
                return Err(ScanError::InvalidConfig(
                    "Reputation API key must not be blank".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn defaults() {
        let c = ScanConfig::default();
        assert!(c.reputation_api_key.is_none());
        assert_eq!(c.api_timeout_secs, 10);
        assert_eq!(c.reputation_endpoint, DEFAULT_REPUTATION_ENDPOINT);
        assert_eq!(c.max_rendered_pixels, 2000);
    }

    #[test]
    fn builder_clamps_pixel_floor() {
        let c = ScanConfig::builder()
            .max_rendered_pixels(10)
            .build()
            .unwrap();
        assert_eq!(c.max_rendered_pixels, 100);
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = ScanConfig::builder().api_timeout_secs(0).build().unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig(_)));
    }

    #[test]
    fn blank_api_key_rejected() {
        let err = ScanConfig::builder()
            .reputation_api_key("   ")
            .build()
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig(_)));
    }

    #[test]
    fn format_parse() {
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("SQLITE").unwrap(), OutputFormat::Sqlite);
        assert!(matches!(
            OutputFormat::parse("parquet"),
            Err(ScanError::UnsupportedFormat { format }) if format == "parquet"
        ));
    }

    #[test]
    fn format_inference_from_extension() {
        assert_eq!(
            OutputFormat::infer(&PathBuf::from("out.sqlite")),
            OutputFormat::Sqlite
        );
        assert_eq!(
            OutputFormat::infer(&PathBuf::from("out.DB")),
            OutputFormat::Sqlite
        );
        assert_eq!(
            OutputFormat::infer(&PathBuf::from("out.json")),
            OutputFormat::Json
        );
        // Unknown extensions fall back to JSON rather than failing.
        assert_eq!(
            OutputFormat::infer(&PathBuf::from("results.txt")),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::infer(&PathBuf::from("results")),
            OutputFormat::Json
        );
    }
}
