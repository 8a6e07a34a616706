use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OwaspCategory {
    BrokenAccessControl,
    CryptographicFailures,
    Injection,
    SecurityMisconfiguration,
    SoftwareDataIntegrityFailures,
    ServerSideRequestForgery,
}

impl OwaspCategory {
    pub fn code(&self) -> &'static str {
        match self {
            OwaspCategory::BrokenAccessControl => "OWASP A01:2021",
            OwaspCategory::CryptographicFailures => "OWASP A02:2021",
            OwaspCategory::Injection => "OWASP A03:2021",
            OwaspCategory::SecurityMisconfiguration => "OWASP A05:2021",
            OwaspCategory::SoftwareDataIntegrityFailures => "OWASP A08:2021",
            OwaspCategory::ServerSideRequestForgery => "OWASP A10:2021",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OwaspCategory::BrokenAccessControl => "Broken Access Control",
            OwaspCategory::CryptographicFailures => "Cryptographic Failures",
            OwaspCategory::Injection => "Injection",
            OwaspCategory::SecurityMisconfiguration => "Security Misconfiguration",
            OwaspCategory::SoftwareDataIntegrityFailures => {
                "Software and Data Integrity Failures"
            }
            OwaspCategory::ServerSideRequestForgery => "Server-Side Request Forgery",
        }
    }
}

impl fmt::Display for OwaspCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingType {
    InvalidUrl,
    InsecureTransport,
    MissingHsts,
    MissingContentSecurityPolicy,
    WeakFrameOptions,
    PermissiveCors,
    MissingCacheControl,
    MissingSecurityHeader,
    CrossSiteScripting,
    SqlInjection,
    NoSqlInjection,
    ServerSideRequestForgery,
    PathTraversal,
    SensitiveDataExposure,
    RemoteCodeExecution,
    MissingCsrfToken,
    SensitiveDataInRequest,
}

impl FindingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingType::InvalidUrl => "invalid_url",
            FindingType::InsecureTransport => "insecure_transport",
            FindingType::MissingHsts => "missing_hsts",
            FindingType::MissingContentSecurityPolicy => "missing_csp",
            FindingType::WeakFrameOptions => "weak_frame_options",
            FindingType::PermissiveCors => "permissive_cors",
            FindingType::MissingCacheControl => "missing_cache_control",
            FindingType::MissingSecurityHeader => "missing_security_header",
            FindingType::CrossSiteScripting => "xss",
            FindingType::SqlInjection => "sql_injection",
            FindingType::NoSqlInjection => "nosql_injection",
            FindingType::ServerSideRequestForgery => "ssrf",
            FindingType::PathTraversal => "path_traversal",
            FindingType::SensitiveDataExposure => "sensitive_data_exposure",
            FindingType::RemoteCodeExecution => "remote_code_execution",
            FindingType::MissingCsrfToken => "missing_csrf_token",
            FindingType::SensitiveDataInRequest => "sensitive_data_in_request",
        }
    }

    /// OWASP Top 10 (2021) bucket the finding is reported under. URL parse
    /// failures are not vulnerabilities and have none.
    pub fn owasp_category(&self) -> Option<OwaspCategory> {
        match self {
            FindingType::InvalidUrl => None,
            FindingType::InsecureTransport
            | FindingType::MissingHsts
            | FindingType::SensitiveDataExposure
            | FindingType::SensitiveDataInRequest => Some(OwaspCategory::CryptographicFailures),
            FindingType::MissingContentSecurityPolicy
            | FindingType::WeakFrameOptions
            | FindingType::PermissiveCors
            | FindingType::MissingSecurityHeader => Some(OwaspCategory::SecurityMisconfiguration),
            FindingType::MissingCacheControl
            | FindingType::PathTraversal
            | FindingType::MissingCsrfToken => Some(OwaspCategory::BrokenAccessControl),
            FindingType::CrossSiteScripting
            | FindingType::SqlInjection
            | FindingType::NoSqlInjection => Some(OwaspCategory::Injection),
            FindingType::ServerSideRequestForgery => Some(OwaspCategory::ServerSideRequestForgery),
            FindingType::RemoteCodeExecution => Some(OwaspCategory::SoftwareDataIntegrityFailures),
        }
    }
}

/// A single heuristic indicator produced by the scanner.
///
/// Renders as `"<code> - <category name>: <description>"`, for example
/// `OWASP A02:2021 - Cryptographic Failures: Not using HTTPS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub finding_type: FindingType,
    pub owasp_category: Option<OwaspCategory>,
    pub description: String,
}

impl Finding {
    pub fn new(finding_type: FindingType, description: impl Into<String>) -> Self {
        Self {
            finding_type,
            owasp_category: finding_type.owasp_category(),
            description: description.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owasp_category {
            Some(category) => write!(f, "{}: {}", category, self.description),
            None => f.write_str(&self.description),
        }
    }
}
