// Passive heuristic checks over a single HTTP transaction

use crate::data::{Finding, FindingType};
use crate::patterns;
use probefx_scanner::{HttpHeaders, HttpTransaction};
use tracing::debug;
use url::Url;

/// Hardening headers reported individually when absent.
pub const SECURITY_HEADERS: [&str; 7] = [
    "X-Content-Type-Options",
    "X-XSS-Protection",
    "Referrer-Policy",
    "Permissions-Policy",
    "Cross-Origin-Opener-Policy",
    "Cross-Origin-Resource-Policy",
    "Cross-Origin-Embedder-Policy",
];

type Detector = fn(&str) -> bool;

/// Response-body detectors in reporting order.
const CONTENT_DETECTORS: [(FindingType, Detector, &str); 7] = [
    (
        FindingType::CrossSiteScripting,
        patterns::is_xss,
        "Potential XSS vulnerability detected",
    ),
    (
        FindingType::SqlInjection,
        patterns::is_sql_injection,
        "Potential SQL injection vulnerability detected",
    ),
    (
        FindingType::NoSqlInjection,
        patterns::is_nosql_injection,
        "Potential NoSQL injection detected",
    ),
    (
        FindingType::ServerSideRequestForgery,
        patterns::is_ssrf,
        "Potential SSRF vulnerability detected",
    ),
    (
        FindingType::PathTraversal,
        patterns::is_path_traversal,
        "Potential path traversal detected",
    ),
    (
        FindingType::SensitiveDataExposure,
        patterns::is_sensitive_data,
        "Potential sensitive data exposure",
    ),
    (
        FindingType::RemoteCodeExecution,
        patterns::is_remote_code_execution,
        "Potential RCE vulnerability",
    ),
];

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub security_headers: Vec<String>,
    /// Bodies longer than this are truncated before pattern matching.
    pub max_body_bytes: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            security_headers: SECURITY_HEADERS.iter().map(|h| h.to_string()).collect(),
            max_body_bytes: None,
        }
    }
}

pub fn check_transport_security(url: &str, headers: &HttpHeaders) -> Vec<Finding> {
    let mut findings = Vec::new();

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            findings.push(Finding::new(
                FindingType::InvalidUrl,
                format!("Invalid URL format: {}", e),
            ));
            return findings;
        }
    };

    if parsed.scheme() != "https" {
        findings.push(Finding::new(
            FindingType::InsecureTransport,
            "Not using HTTPS",
        ));
    }

    if headers
        .get("Strict-Transport-Security")
        .is_none_or(str::is_empty)
    {
        findings.push(Finding::new(
            FindingType::MissingHsts,
            "Missing HSTS header",
        ));
    }

    findings
}

pub fn check_security_headers(headers: &HttpHeaders) -> Vec<Finding> {
    let mut findings = Vec::new();

    if !headers.contains("Content-Security-Policy") {
        findings.push(Finding::new(
            FindingType::MissingContentSecurityPolicy,
            "Missing Content Security Policy",
        ));
    }

    if !matches!(headers.get("X-Frame-Options"), Some("DENY" | "SAMEORIGIN")) {
        findings.push(Finding::new(
            FindingType::WeakFrameOptions,
            "Missing or weak X-Frame-Options",
        ));
    }

    if headers.get("Access-Control-Allow-Origin") == Some("*") {
        findings.push(Finding::new(
            FindingType::PermissiveCors,
            "Overly permissive CORS policy",
        ));
    }

    if !headers.contains("Cache-Control") || !headers.contains("Pragma") {
        findings.push(Finding::new(
            FindingType::MissingCacheControl,
            "Missing cache control headers",
        ));
    }

    findings
}

pub fn check_missing_security_headers<S: AsRef<str>>(
    headers: &HttpHeaders,
    required: &[S],
) -> Vec<Finding> {
    required
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !headers.contains(name))
        .map(|name| {
            Finding::new(
                FindingType::MissingSecurityHeader,
                format!("Missing {}", name),
            )
        })
        .collect()
}

/// Runs every body detector; each family reports once however often it matches.
pub fn check_content_security(content: &str) -> Vec<Finding> {
    CONTENT_DETECTORS
        .iter()
        .filter(|(_, detector, _)| detector(content))
        .map(|(finding_type, _, description)| Finding::new(*finding_type, *description))
        .collect()
}

pub fn check_request_security(request_body: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(check_csrf_token(request_body));
    findings.extend(check_sensitive_request_data(request_body));
    findings
}

/// Absence check, so it must see the whole body.
pub fn check_csrf_token(request_body: &str) -> Option<Finding> {
    if request_body.contains("csrf") || request_body.contains("_token") {
        return None;
    }
    Some(Finding::new(
        FindingType::MissingCsrfToken,
        "Missing CSRF token",
    ))
}

pub fn check_sensitive_request_data(request_body: &str) -> Option<Finding> {
    patterns::is_sensitive_data(request_body).then(|| {
        Finding::new(
            FindingType::SensitiveDataInRequest,
            "Sensitive data in request body",
        )
    })
}

/// Heuristic vulnerability scanner.
///
/// Scanning is pure: no I/O, and the same inputs always give the same
/// findings in the same order (transport, headers, response content, request).
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Empty bodies are treated the same as absent ones. `max_body_bytes`
    /// only limits what the pattern detectors see.
    pub fn scan(
        &self,
        url: &str,
        headers: &HttpHeaders,
        request_body: Option<&str>,
        response_body: Option<&str>,
    ) -> Vec<Finding> {
        let mut all_findings = Vec::new();

        all_findings.extend(check_transport_security(url, headers));
        all_findings.extend(check_security_headers(headers));
        all_findings.extend(check_missing_security_headers(
            headers,
            &self.config.security_headers,
        ));

        if let Some(body) = response_body.filter(|b| !b.is_empty()) {
            all_findings.extend(check_content_security(self.bounded(body)));
        }

        if let Some(body) = request_body.filter(|b| !b.is_empty()) {
            all_findings.extend(check_csrf_token(body));
            all_findings.extend(check_sensitive_request_data(self.bounded(body)));
        }

        debug!("Scan of {} produced {} findings", url, all_findings.len());
        all_findings
    }

    pub fn scan_transaction(&self, transaction: &HttpTransaction) -> Vec<Finding> {
        self.scan(
            &transaction.url,
            &transaction.response_headers,
            transaction.request_body.as_deref(),
            transaction.response_body.as_deref(),
        )
    }

    fn bounded<'a>(&self, body: &'a str) -> &'a str {
        match self.config.max_body_bytes {
            Some(limit) if body.len() > limit => {
                let mut end = limit;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                &body[..end]
            }
            _ => body,
        }
    }
}
