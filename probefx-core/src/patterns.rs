//! Heuristic content detectors.
//!
//! One pattern per vulnerability family, each exposed as its own predicate so
//! the scanner can report at most one finding per family. The patterns are
//! deliberately loose: they flag indicators worth a human look, and ordinary
//! prose (a login form mentioning "password", say) will trip some of them.

use once_cell::sync::Lazy;
use regex::Regex;

static XSS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(<script|javascript:|data:|vbscript:|\\u|\\x|onerror=|onload=|onfocus=|onmouseover=|eval\(|String\.fromCharCode|\bdocument\.|\bwindow\.|alert\(|confirm\(|prompt\()",
    )
    .unwrap()
});

// a statement keyword followed on the same line by a table/schema keyword
static SQL_INJECTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\b(SELECT|INSERT|UPDATE|DELETE|DROP|UNION|OR|'--|;--|/\*|\*/|@@|@\w+)\b.*\b(FROM|INTO|WHERE|TABLE|DATABASE|INFORMATION_SCHEMA)\b)",
    )
    .unwrap()
});

static NOSQL_INJECTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\$where|\$regex|\$gt|\$lt|\$ne|\$in|\$nin)").unwrap());

static SSRF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(file:|gopher:|dict:|ldap:|ssh2:|tcp:|telnet:|ftp:|jar:)").unwrap()
});

static PATH_TRAVERSAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\.\./|%2e%2e/|%252e%252e/)").unwrap());

static SENSITIVE_DATA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|passwd|pwd|secret|token|api[_-]?key|auth|credential)").unwrap()
});

static RCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(exec|system|popen|pcntl_exec|shell_exec|passthru|eval|assert)\b")
        .unwrap()
});

/// Script tags, script-capable URI schemes, inline handlers, `eval(` and
/// friends, DOM globals and escaped-character sequences.
pub fn is_xss(text: &str) -> bool {
    XSS_PATTERN.is_match(text)
}

pub fn is_sql_injection(text: &str) -> bool {
    SQL_INJECTION_PATTERN.is_match(text)
}

/// MongoDB-style query operators.
pub fn is_nosql_injection(text: &str) -> bool {
    NOSQL_INJECTION_PATTERN.is_match(text)
}

/// Non-HTTP URI schemes commonly abused for server-side request forgery.
pub fn is_ssrf(text: &str) -> bool {
    SSRF_PATTERN.is_match(text)
}

/// `../` in plain, URL-encoded or double URL-encoded form.
pub fn is_path_traversal(text: &str) -> bool {
    PATH_TRAVERSAL_PATTERN.is_match(text)
}

pub fn is_sensitive_data(text: &str) -> bool {
    SENSITIVE_DATA_PATTERN.is_match(text)
}

/// Command-execution function names, matched as whole words.
pub fn is_remote_code_execution(text: &str) -> bool {
    RCE_PATTERN.is_match(text)
}
