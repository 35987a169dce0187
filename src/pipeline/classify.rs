//! URL risk classification: the decision core of the scanner.
//!
//! Every decoded QR payload is a *candidate URL* — raw text, never validated.
//! The classifier decides whether it is suspicious by exactly one of two
//! mechanisms, selected once at construction:
//!
//! * **Reputation** — a credential is configured, so each candidate is
//!   submitted to the VirusTotal URL endpoint. Any failure (network, timeout,
//!   non-2xx, malformed body, missing field) yields a fail-open verdict with
//!   `source = Error`; the scan continues and the diagnostic is only logged.
//! * **Heuristic** — no credential, so a pure, offline rule catalogue scores
//!   the candidate. An unparsable candidate is fail-closed (`malicious`).
//!
//! The two failure policies are deliberately asymmetric — that is observed
//! upstream behaviour, kept as-is pending product review. Likewise the TLD
//! rule uses substring containment against the host, not label matching, so
//! `notru.example` style hosts can misfire.

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::record::Verdict;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// TLD substrings that flag a host as suspicious.
const SUSPICIOUS_TLDS: [&str; 7] = [".ru", ".cn", ".tk", ".ml", ".ga", ".cf", ".gq"];

/// Keywords that flag a full URL as suspicious (matched case-insensitively).
const RISKY_KEYWORDS: [&str; 6] = ["login", "signin", "password", "bank", "paypal", "bitcoin"];

/// Raw IPv4-literal host: four dot-separated runs of digits, nothing else.
/// No range validation — `999.999.999.999` matches too.
static RE_IPV4_HOST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").unwrap());

/// Classification strategy, fixed for the lifetime of a scan.
///
/// Selecting the branch at construction time (rather than re-checking the
/// credential per candidate) keeps [`Classifier::classify`] a single
/// straight-line dispatch and lets the reputation variant own its HTTP
/// client and timeout.
pub enum Classifier {
    /// Offline rule scoring; never fails.
    Heuristic,
    /// Remote reputation lookup per candidate.
    Reputation {
        client: reqwest::Client,
        credential: String,
        endpoint: String,
    },
}

impl Classifier {
    /// Select the strategy implied by the config: reputation when a
    /// credential is present, heuristic otherwise. Never both.
    pub fn from_config(config: &ScanConfig) -> Result<Self, ScanError> {
        match config.reputation_api_key {
            Some(ref key) => Self::reputation(
                key,
                &config.reputation_endpoint,
                Duration::from_secs(config.api_timeout_secs),
            ),
            None => Ok(Classifier::Heuristic),
        }
    }

    /// Build the reputation variant with an explicit endpoint and timeout.
    pub fn reputation(
        credential: &str,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScanError::Internal(format!("HTTP client: {e}")))?;
        Ok(Classifier::Reputation {
            client,
            credential: credential.to_string(),
            endpoint: endpoint.to_string(),
        })
    }

    /// Classify one candidate URL.
    ///
    /// Infallible by design: lookup failures are encoded in the verdict
    /// (`source = Error`, not malicious) so a broken external dependency
    /// cannot abort the scan. No retries on either path.
    pub async fn classify(&self, candidate: &str) -> Verdict {
        match self {
            Classifier::Heuristic => Verdict::heuristic(is_suspicious(candidate)),
            Classifier::Reputation {
                client,
                credential,
                endpoint,
            } => match lookup_reputation(client, credential, endpoint, candidate).await {
                Ok(malicious_count) => {
                    debug!(candidate, malicious_count, "reputation lookup complete");
                    Verdict::reputation(malicious_count > 0)
                }
                Err(detail) => {
                    warn!(candidate, %detail, "reputation lookup failed; recording error verdict");
                    Verdict::lookup_failed()
                }
            },
        }
    }
}

// ── Reputation path ──────────────────────────────────────────────────────

/// Response shape of the VirusTotal URL endpoint, reduced to the one field
/// the verdict needs. Every level is required: a body missing any of them
/// deserialises to an error and counts as a failed lookup.
#[derive(Debug, Deserialize)]
struct ReputationResponse {
    data: ReputationData,
}

#[derive(Debug, Deserialize)]
struct ReputationData {
    attributes: ReputationAttributes,
}

#[derive(Debug, Deserialize)]
struct ReputationAttributes {
    last_analysis_stats: AnalysisStats,
}

#[derive(Debug, Deserialize)]
struct AnalysisStats {
    /// Number of engines flagging the URL as malicious.
    malicious: u64,
}

/// Submit the candidate to the reputation service and return the count of
/// engines flagging it malicious.
async fn lookup_reputation(
    client: &reqwest::Client,
    credential: &str,
    endpoint: &str,
    candidate: &str,
) -> Result<u64, String> {
    let response = client
        .post(endpoint)
        .header("x-apikey", credential)
        .form(&[("url", candidate)])
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                format!("timed out: {e}")
            } else {
                format!("request failed: {e}")
            }
        })?;

    let response = response
        .error_for_status()
        .map_err(|e| format!("non-success status: {e}"))?;

    let body: ReputationResponse = response
        .json()
        .await
        .map_err(|e| format!("malformed response body: {e}"))?;

    Ok(body.data.attributes.last_analysis_stats.malicious)
}

// ── Heuristic path ───────────────────────────────────────────────────────

/// Score a candidate URL with the offline rule catalogue.
///
/// Pure and deterministic — same input, same answer, no I/O. The rules are a
/// logical OR, evaluated in a fixed order:
///
/// 1. host contains a denylisted TLD substring
/// 2. host is a raw IPv4 literal
/// 3. full URL contains a risky keyword (case-insensitive)
/// 4. URL contains `%` and is longer than 100 characters
/// 5. URL is longer than 200 characters
///
/// A candidate that does not parse as a URL at all is suspicious by default.
pub fn is_suspicious(candidate: &str) -> bool {
    let parsed = match Url::parse(candidate) {
        Ok(u) => u,
        // Fail-closed: an unparsable payload pretending to be a link is
        // itself a signal.
        Err(_) => return true,
    };

    let host = parsed.host_str().unwrap_or("").to_lowercase();

    if SUSPICIOUS_TLDS.iter().any(|tld| host.contains(tld)) {
        return true;
    }

    if RE_IPV4_HOST.is_match(&host) {
        return true;
    }

    let lowered = candidate.to_lowercase();
    if RISKY_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return true;
    }

    if candidate.contains('%') && candidate.len() > 100 {
        return true;
    }

    if candidate.len() > 200 {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::VerdictSource;

    // ── Heuristic rules ──────────────────────────────────────────────────

    #[test]
    fn clean_short_url_is_benign() {
        assert!(!is_suspicious("http://example.com"));
        assert!(!is_suspicious("https://docs.example.org/guide"));
    }

    #[test]
    fn denylisted_tld_substring_flags() {
        for url in [
            "http://badsite.ru",
            "http://shop.cn/item",
            "https://free.tk",
            "https://a.ml",
            "https://b.ga",
            "https://c.cf",
            "https://d.gq",
        ] {
            assert!(is_suspicious(url), "{url} should be flagged");
        }
    }

    #[test]
    fn tld_rule_is_substring_not_suffix() {
        // Containment, not label matching: `.ru.` mid-host still fires.
        assert!(is_suspicious("http://example.com.ru.legit-looking.com"));
    }

    #[test]
    fn ipv4_literal_host_flags() {
        assert!(is_suspicious("http://198.51.100.7/"));
        assert!(is_suspicious("http://10.0.0.1/path?q=1"));
    }

    #[test]
    fn out_of_range_ipv4_still_flags() {
        // The rule does no range validation; whether the URL parser or the
        // regex rejects it first, the verdict is the same.
        assert!(is_suspicious("http://999.999.999.999"));
    }

    #[test]
    fn risky_keywords_flag() {
        assert!(is_suspicious("http://example.com/login"));
        assert!(is_suspicious("http://example.com/SignIn"));
        assert!(is_suspicious("http://example.com?q=PayPal"));
        assert!(is_suspicious("http://example.com/my-bitcoin-wallet"));
    }

    #[test]
    fn percent_and_length_flags() {
        let long_encoded = format!("http://example.com/{}%20x", "a".repeat(100));
        assert!(long_encoded.len() > 100);
        assert!(is_suspicious(&long_encoded));

        // Percent alone, under the threshold: benign.
        assert!(!is_suspicious("http://example.com/a%20b"));
    }

    #[test]
    fn very_long_url_flags() {
        let long = format!("http://example.com/{}", "a".repeat(200));
        assert!(is_suspicious(&long));
    }

    #[test]
    fn unparsable_candidate_is_fail_closed() {
        assert!(is_suspicious("not a url at all"));
        assert!(is_suspicious(""));
    }

    #[test]
    fn heuristic_is_idempotent() {
        let candidate = "http://example.com/page";
        assert_eq!(is_suspicious(candidate), is_suspicious(candidate));
    }

    // ── Strategy dispatch ────────────────────────────────────────────────

    #[tokio::test]
    async fn heuristic_classifier_sets_source() {
        let classifier = Classifier::Heuristic;

        let benign = classifier.classify("http://example.com").await;
        assert!(!benign.malicious);
        assert_eq!(benign.source, VerdictSource::Heuristic);

        let flagged = classifier.classify("http://example.com/login").await;
        assert!(flagged.malicious);
        assert_eq!(flagged.source, VerdictSource::Heuristic);
    }

    #[tokio::test]
    async fn classify_without_credential_is_idempotent() {
        let classifier = Classifier::Heuristic;
        let a = classifier.classify("https://example.org/x").await;
        let b = classifier.classify("https://example.org/x").await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn unreachable_reputation_service_fails_open() {
        // Port 9 (discard) is not listening; the connection is refused
        // immediately, well within the 2 s timeout.
        let classifier = Classifier::reputation(
            "test-key",
            "http://127.0.0.1:9/api/v3/urls",
            Duration::from_secs(2),
        )
        .unwrap();

        let verdict = classifier.classify("http://example.com").await;
        assert!(!verdict.malicious);
        assert_eq!(verdict.source, VerdictSource::Error);
    }

    #[tokio::test]
    async fn from_config_selects_strategy_once() {
        let heuristic = Classifier::from_config(&ScanConfig::default()).unwrap();
        assert!(matches!(heuristic, Classifier::Heuristic));

        let config = ScanConfig::builder()
            .reputation_api_key("k")
            .build()
            .unwrap();
        let reputation = Classifier::from_config(&config).unwrap();
        assert!(matches!(reputation, Classifier::Reputation { .. }));
    }
}
