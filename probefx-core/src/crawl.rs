use indicatif::{ProgressBar, ProgressStyle};
use probefx_scanner::Crawler;
use probefx_scanner::client::DEFAULT_USER_AGENT;
use probefx_scanner::crawler::{DEFAULT_CRAWL_TIMEOUT, MAX_PAGES};
use probefx_scanner::result::CrawlResult;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub url: String,
    pub max_depth: usize,
    pub max_pages: usize,
    pub timeout: Duration,
    pub user_agent: String,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_depth: 3,
            max_pages: MAX_PAGES,
            timeout: DEFAULT_CRAWL_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            show_progress_bars: false,
        }
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options and return the visited pages in
/// visit order.
pub async fn execute_crawl(options: CrawlOptions) -> Vec<CrawlResult> {
    let CrawlOptions {
        url,
        max_depth,
        max_pages,
        timeout,
        user_agent,
        show_progress_bars,
    } = options;

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let mut crawler = Crawler::new()
        .with_timeout(timeout)
        .with_user_agent(user_agent)
        .with_max_pages(max_pages);

    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        crawler = crawler.with_progress_callback(Arc::new(move |visited: usize, url: String| {
            pb_clone.set_message(format!(
                "Crawling... {} pages visited ({})",
                visited,
                extract_url_path(&url)
            ));
        }));
    }

    let pages = crawler.crawl_pages(&url, max_depth).await;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!("Crawl complete! {} pages visited", pages.len()));
    }

    pages
}

/// Generate a plain-text crawl report from results, pages listed in visit order
pub fn generate_crawl_report(results: &[CrawlResult]) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Pages crawled: {}\n", results.len()));

    let total_links: usize = results.iter().map(|r| r.links_found.len()).sum();
    report.push_str(&format!("  Total links found: {}\n", total_links));

    let failed = results.iter().filter(|r| r.is_error()).count();
    report.push_str(&format!("  Failed fetches: {}\n", failed));

    let deepest = results.iter().map(|r| r.depth).max().unwrap_or(0);
    report.push_str(&format!("  Deepest level: {}\n", deepest));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    if let Some(first) = results.first() {
        let host = Url::parse(&first.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_else(|| first.url.clone());
        report.push_str(&format!("## {}\n", host));
        report.push_str(&format!("  {} pages found\n\n", results.len()));
    }

    for result in results {
        let path = extract_url_path(&result.url);
        let status = match result.status_code {
            0 => "---".to_string(),
            code => code.to_string(),
        };

        let mut line = format!("  {} [{}] {}", status, result.depth, path);

        // Only show MIME type if it's not HTML
        if let Some(ref content_type) = result.content_type
            && !content_type.contains("text/html")
        {
            line.push_str(&format!(" ({})", content_type));
        }
        if let Some(ref error) = result.error
            && result.status_code == 0
        {
            line.push_str(&format!(" !! {}", error));
        }

        report.push_str(&line);
        report.push('\n');
    }

    report
}
