// Report generation for scan and crawl results

use crate::data::Finding;
use chrono::{DateTime, Utc};
use probefx_scanner::{CrawlResult, HttpHeaders, HttpMethod, HttpTransaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindingData {
    pub finding_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owasp_category: Option<String>,
    pub description: String,
    pub message: String,
}

impl From<&Finding> for FindingData {
    fn from(finding: &Finding) -> Self {
        Self {
            finding_type: finding.finding_type.as_str().to_string(),
            owasp_category: finding.owasp_category.map(|c| c.code().to_string()),
            description: finding.description.clone(),
            message: finding.to_string(),
        }
    }
}

/// Number of findings per OWASP code; findings without a category are
/// counted under "Other".
pub fn count_by_category(findings: &[Finding]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for finding in findings {
        let key = finding.owasp_category.map(|c| c.code()).unwrap_or("Other");
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Result of sending one request and scanning the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub url: String,
    pub method: HttpMethod,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
    pub response_headers: HttpHeaders,
    pub response_body: String,
    pub findings: Vec<FindingData>,
}

impl ScanReport {
    pub fn new(transaction: &HttpTransaction, findings: &[Finding]) -> Self {
        Self {
            url: transaction.url.clone(),
            method: transaction.method,
            status_code: transaction.status_code,
            timestamp: Utc::now(),
            response_headers: transaction.response_headers.clone(),
            response_body: transaction.response_body.clone().unwrap_or_default(),
            findings: findings.iter().map(FindingData::from).collect(),
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Text => Ok(self.to_text()),
            ReportFormat::Json => serde_json::to_string_pretty(self),
        }
    }

    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Security Test Results ===\n\n");
        report.push_str(&format!("URL: {}\n", self.url));
        report.push_str(&format!("Method: {}\n", self.method));
        report.push_str(&format!("Status: {}\n", self.status_code));
        report.push_str(&format!("Timestamp: {}\n\n", self.timestamp.to_rfc3339()));

        report.push_str("=== Response Headers ===\n");
        if self.response_headers.is_empty() {
            report.push_str("(none)\n");
        }
        for (name, value) in self.response_headers.iter() {
            report.push_str(&format!("{}: {}\n", name, value));
        }

        report.push_str("\n=== Response ===\n");
        report.push_str(&self.response_body);
        if !self.response_body.ends_with('\n') {
            report.push('\n');
        }

        report.push_str("\n=== Security Findings ===\n");
        if self.findings.is_empty() {
            report.push_str("No findings\n");
        }
        for finding in &self.findings {
            report.push_str(&finding.message);
            report.push('\n');
        }

        report
    }
}

#[derive(Debug, Clone, Serialize)]
struct CrawlReport<'a> {
    start_url: &'a str,
    generated_at: DateTime<Utc>,
    pages_crawled: usize,
    urls: Vec<&'a str>,
    pages: &'a [CrawlResult],
}

/// JSON crawl report; `urls` keeps visit order.
pub fn generate_crawl_json(
    start_url: &str,
    results: &[CrawlResult],
) -> Result<String, serde_json::Error> {
    let report = CrawlReport {
        start_url,
        generated_at: Utc::now(),
        pages_crawled: results.len(),
        urls: results.iter().map(|r| r.url.as_str()).collect(),
        pages: results,
    };
    serde_json::to_string_pretty(&report)
}

/// Writes a report, creating missing parent directories.
pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
