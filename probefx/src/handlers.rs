use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use probefx_core::data::Finding;
use probefx_core::report::{
    ReportFormat, ScanReport, count_by_category, generate_crawl_json, save_report,
};
use probefx_core::security::{ScanConfig, Scanner};
use probefx_scanner::client::DEFAULT_USER_AGENT;
use probefx_scanner::normalize::with_default_scheme;
use probefx_scanner::{HttpHeaders, HttpMethod, HttpTransaction, TransactionClient};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

// Re-export crawl types and functions from probefx-core
pub use probefx_core::crawl::{
    CrawlOptions, execute_crawl, extract_url_path, generate_crawl_report,
};

/// Parse a `Name: Value` header argument
pub fn parse_header_line(line: &str) -> Result<(String, String)> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| anyhow!("Header '{}' is not in 'Name: Value' form", line))?;

    let name = name.trim();
    if name.is_empty() {
        bail!("Header '{}' has an empty name", line);
    }

    Ok((name.to_string(), value.trim().to_string()))
}

/// Build request headers from repeated `-H` arguments, adding `Accept: */*`
/// unless the caller set one.
pub fn build_headers<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<HttpHeaders> {
    let mut headers = HttpHeaders::new();
    for line in lines {
        let (name, value) = parse_header_line(line)?;
        headers.insert(name, value);
    }
    if !headers.contains("Accept") {
        headers.insert("Accept", "*/*");
    }
    Ok(headers)
}

/// Expand a leading `~` in an output path
pub fn expand_output_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}

/// Print the report, or save it when an output path was given
pub fn write_report(content: &str, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let path = expand_output_path(path);
            save_report(content, &path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("{} Report saved to {}", "✓".green().bold(), path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn report_format(args: &ArgMatches) -> Result<ReportFormat> {
    args.get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text")
        .parse::<ReportFormat>()
        .map_err(|e| anyhow!(e))
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let url = sub_matches
        .get_one::<String>("url")
        .context("--url is required")?;
    let max_depth = *sub_matches.get_one::<usize>("depth").unwrap_or(&3);
    let max_pages = *sub_matches.get_one::<usize>("max-pages").unwrap_or(&500);
    let timeout_ms = *sub_matches.get_one::<u64>("timeout-ms").unwrap_or(&5000);
    let user_agent = sub_matches
        .get_one::<String>("user-agent")
        .cloned()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let output = sub_matches.get_one::<PathBuf>("output");
    let format = report_format(sub_matches)?;

    if !quiet {
        println!("\n🕷️  Crawling {}", url);
        println!("Max depth: {}", max_depth);
        println!("Max pages: {}\n", max_pages);
    }

    let options = CrawlOptions {
        url: url.clone(),
        max_depth,
        max_pages,
        timeout: Duration::from_millis(timeout_ms),
        user_agent,
        show_progress_bars: !quiet,
    };

    let results = execute_crawl(options).await;
    if results.is_empty() {
        bail!("Nothing crawled from {}", url);
    }

    let report = match format {
        ReportFormat::Text => generate_crawl_report(&results),
        ReportFormat::Json => generate_crawl_json(url, &results)?,
    };

    write_report(&report, output)?;

    if results[0].is_error() && results[0].status_code == 0 {
        bail!("Start page {} is unreachable", results[0].url);
    }

    Ok(())
}

/// Everything needed to send one request and scan it
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HttpHeaders,
    pub body: Option<String>,
    pub timeout: Duration,
    pub max_body_bytes: Option<usize>,
}

/// Send the request, then scan the resulting transaction
pub async fn run_request(options: RequestOptions) -> Result<(HttpTransaction, Vec<Finding>)> {
    let client = TransactionClient::with_config(options.timeout, DEFAULT_USER_AGENT)
        .context("Failed to create HTTP client")?;

    let target = with_default_scheme(&options.url);
    let response = client
        .send(
            &target,
            options.method,
            &options.headers,
            options.body.as_deref(),
        )
        .await
        .with_context(|| format!("{} {} failed", options.method, target))?;

    // GET and friends never send a body, so there is nothing to scan on that side
    let sent_body = options.body.filter(|_| options.method.carries_body());
    let transaction = HttpTransaction::from_exchange(
        &target,
        options.method,
        options.headers,
        sent_body,
        response,
    );

    let scanner = Scanner::with_config(ScanConfig {
        max_body_bytes: options.max_body_bytes,
        ..ScanConfig::default()
    });
    let findings = scanner.scan_transaction(&transaction);
    debug!("{} findings for {}", findings.len(), target);

    Ok((transaction, findings))
}

pub async fn handle_request(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let url = sub_matches
        .get_one::<String>("url")
        .context("--url is required")?;
    let method = sub_matches
        .get_one::<String>("method")
        .map(String::as_str)
        .unwrap_or("GET")
        .parse::<HttpMethod>()?;
    let headers = build_headers(
        sub_matches
            .get_many::<String>("header")
            .into_iter()
            .flatten()
            .map(String::as_str),
    )?;
    let body = sub_matches.get_one::<String>("data").cloned();
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&30);
    let max_body_bytes = sub_matches.get_one::<usize>("max-body-bytes").copied();
    let output = sub_matches.get_one::<PathBuf>("output");
    let format = report_format(sub_matches)?;

    if body.is_some() && !method.carries_body() && !quiet {
        println!(
            "{} request body ignored for {} requests",
            "⚠".yellow().bold(),
            method
        );
    }

    let (transaction, findings) = run_request(RequestOptions {
        url: url.clone(),
        method,
        headers,
        body,
        timeout: Duration::from_secs(timeout),
        max_body_bytes,
    })
    .await?;

    let report = ScanReport::new(&transaction, &findings);
    let content = report.render(format)?;
    write_report(&content, output)?;

    if !quiet && (format == ReportFormat::Text || output.is_some()) {
        print_findings_summary(&findings);
    }

    Ok(())
}

fn print_findings_summary(findings: &[Finding]) {
    println!("{}", "═".repeat(60).bright_blue().bold());
    if findings.is_empty() {
        println!("{} No findings", "✓".green().bold());
        return;
    }

    println!(
        "{} {} findings",
        "⚠".yellow().bold(),
        findings.len().to_string().bold()
    );
    for (category, count) in count_by_category(findings) {
        println!("  {:<16} {}", category, count);
    }
}
