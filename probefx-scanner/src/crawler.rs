use crate::client::DEFAULT_USER_AGENT;
use crate::error::Result;
use crate::normalize::{is_same_site, normalize_url, site_host};
use crate::result::CrawlResult;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_CRAWL_TIMEOUT: Duration = Duration::from_millis(5000);
pub const MAX_PAGES: usize = 500;

/// Called with the number of pages visited so far and the page being fetched.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Breadth-first, same-site crawler with a hard page cap.
///
/// Pages are fetched one at a time in BFS order. Every call to
/// [`Crawler::crawl`] starts from a fresh visited set, so one crawler can be
/// shared and reused.
pub struct Crawler {
    timeout: Duration,
    user_agent: String,
    max_pages: usize,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_CRAWL_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_pages: MAX_PAGES,
            progress_callback: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawls from `start_url` and returns the visited URLs in visit order.
    ///
    /// Never fails: an invalid start URL or an unreachable start host gives an
    /// empty list.
    pub async fn crawl(&self, start_url: &str, max_depth: usize) -> Vec<String> {
        let pages = self.crawl_pages(start_url, max_depth).await;

        // status 0 means no response at all
        if pages
            .first()
            .is_some_and(|start| start.is_error() && start.status_code == 0)
        {
            warn!("Start page {} is unreachable", start_url);
            return Vec::new();
        }

        pages.into_iter().map(|page| page.url).collect()
    }

    /// Same traversal as [`Crawler::crawl`], keeping the per-page details.
    pub async fn crawl_pages(&self, start_url: &str, max_depth: usize) -> Vec<CrawlResult> {
        let Some(start) = normalize_url(start_url) else {
            warn!("Cannot crawl {:?}: not a valid URL", start_url);
            return Vec::new();
        };
        if site_host(&start).is_none() {
            warn!("Cannot crawl {}: no host", start);
            return Vec::new();
        }

        let client = match self.build_client() {
            Ok(client) => client,
            Err(e) => {
                warn!("Failed to create HTTP client: {}", e);
                return Vec::new();
            }
        };

        info!(
            "Starting crawl of {} (max depth {}, max pages {})",
            start, max_depth, self.max_pages
        );

        // pages doubles as the ordered visited list
        let mut visited: HashSet<String> = HashSet::new();
        let mut pages: Vec<CrawlResult> = Vec::new();
        let mut frontier: VecDeque<(String, usize)> = VecDeque::new();
        frontier.push_back((start.clone(), 0));

        while visited.len() < self.max_pages {
            let Some((url, depth)) = frontier.pop_front() else {
                break;
            };

            if depth > max_depth || visited.contains(&url) {
                continue;
            }
            if !is_same_site(&url, &start) {
                debug!("Skipping off-site link {}", url);
                continue;
            }

            visited.insert(url.clone());

            if let Some(ref callback) = self.progress_callback {
                callback(visited.len(), url.clone());
            }

            match Self::fetch_and_parse(&client, &url, depth).await {
                Ok(page) => {
                    for link in &page.links_found {
                        if visited.contains(link) {
                            continue;
                        }
                        if frontier.len() + visited.len() >= self.max_pages {
                            break;
                        }
                        frontier.push_back((link.clone(), depth + 1));
                    }
                    pages.push(page);
                }
                Err(e) => {
                    warn!("Crawl error for {}: {}", url, e);
                    pages.push(CrawlResult::with_error(url, depth, e.to_string()));
                }
            }
        }

        info!("Crawl complete. Visited {} pages", pages.len());
        pages
    }

    fn build_client(&self) -> Result<Client> {
        let client = Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(client)
    }

    async fn fetch_and_parse(client: &Client, url: &str, depth: usize) -> Result<CrawlResult> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = client.get(url).send().await?;
        let response_time = start.elapsed();

        let status = response.status();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let mut result = CrawlResult::new(url.to_string(), depth);
        result.status_code = status.as_u16();
        result.content_type = content_type.clone();
        result.response_time = response_time;

        if !status.is_success() {
            debug!("{} answered {}, not following links", url, status);
            result.error = Some(format!("HTTP status {}", status.as_u16()));
            return Ok(result);
        }

        if !Self::is_html(content_type.as_deref()) {
            debug!("{} is not HTML, not following links", url);
            return Ok(result);
        }

        let body = response.text().await?;
        result.links_found = Self::extract_links(&body, &final_url);
        debug!("Found {} links on {}", result.links_found.len(), url);

        Ok(result)
    }

    /// Text and XML documents are parsed; a missing content type is treated as HTML.
    fn is_html(content_type: Option<&str>) -> bool {
        match content_type {
            None => true,
            Some(ct) => {
                let ct = ct.to_ascii_lowercase();
                ct.starts_with("text/") || ct.contains("xml")
            }
        }
    }

    /// Links are resolved against the document's `<base href>` when it has one.
    fn extract_links(html: &str, page_url: &Url) -> Vec<String> {
        let (Ok(link_selector), Ok(base_selector)) =
            (Selector::parse("a[href]"), Selector::parse("base[href]"))
        else {
            return Vec::new();
        };
        let document = Html::parse_document(html);

        let base = document
            .select(&base_selector)
            .next()
            .and_then(|element| element.value().attr("href"))
            .and_then(|href| page_url.join(href.trim()).ok())
            .unwrap_or_else(|| page_url.clone());

        document
            .select(&link_selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| Self::resolve_url(&base, href))
            .collect()
    }

    /// Resolves an href against the page URL, keeping only http(s) targets.
    fn resolve_url(base: &Url, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        let resolved = base.join(href).ok()?;
        if !matches!(resolved.scheme(), "http" | "https") {
            return None;
        }

        normalize_url(resolved.as_str())
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    async fn mount_html(server: &MockServer, route: &str, html: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(html.into_bytes()),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_link_discovery_in_bfs_order() {
        let mock_server = MockServer::start().await;
        let root = mock_server.uri();

        mount_html(
            &mock_server,
            "/",
            format!(
                r#"<html><body>
                    <a href="/page1">Page 1</a>
                    <a href="{}/page2">Page 2</a>
                </body></html>"#,
                root
            ),
        )
        .await;
        mount_html(
            &mock_server,
            "/page1",
            r#"<html><body><a href="/page1/deep">Deep</a></body></html>"#.to_string(),
        )
        .await;
        mount_html(&mock_server, "/page2", "<html><body>P2</body></html>".to_string()).await;
        mount_html(&mock_server, "/page1/deep", "<html><body>D</body></html>".to_string()).await;

        let crawler = Crawler::new();
        let urls = crawler.crawl(&root, 2).await;

        assert_eq!(
            urls,
            vec![
                root.clone(),
                format!("{}/page1", root),
                format!("{}/page2", root),
                format!("{}/page1/deep", root),
            ]
        );
    }

    #[tokio::test]
    async fn test_depth_zero_only_visits_start() {
        let mock_server = MockServer::start().await;

        mount_html(
            &mock_server,
            "/",
            r#"<html><body><a href="/child">Child</a></body></html>"#.to_string(),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/child"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let urls = Crawler::new().crawl(&mock_server.uri(), 0).await;

        assert_eq!(urls, vec![mock_server.uri()]);
    }

    #[tokio::test]
    async fn test_depth_limit_stops_traversal() {
        let mock_server = MockServer::start().await;
        let root = mock_server.uri();

        mount_html(
            &mock_server,
            "/",
            r#"<html><body><a href="/a">A</a></body></html>"#.to_string(),
        )
        .await;
        mount_html(
            &mock_server,
            "/a",
            r#"<html><body><a href="/b">B</a></body></html>"#.to_string(),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/b"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let urls = Crawler::new().crawl(&root, 1).await;

        assert_eq!(urls, vec![root.clone(), format!("{}/a", root)]);
    }

    #[tokio::test]
    async fn test_self_links_are_visited_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(
                        r##"<html><body>
                            <a href="/">Home</a>
                            <a href="/#top">Top</a>
                            <a href="">Empty</a>
                        </body></html>"##
                            .as_bytes(),
                    ),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let urls = Crawler::new().crawl(&mock_server.uri(), 5).await;

        assert_eq!(urls, vec![mock_server.uri()]);
    }

    #[tokio::test]
    async fn test_off_site_and_non_http_links_are_ignored() {
        let mock_server = MockServer::start().await;

        mount_html(
            &mock_server,
            "/",
            r#"<html><body>
                <a href="http://elsewhere.invalid/page">External</a>
                <a href="mailto:someone@example.com">Mail</a>
                <a href="javascript:void(0)">JS</a>
                <a href="ftp://files.example.com/">FTP</a>
            </body></html>"#
                .to_string(),
        )
        .await;

        let urls = Crawler::new().crawl(&mock_server.uri(), 3).await;

        assert_eq!(urls, vec![mock_server.uri()]);
    }

    #[tokio::test]
    async fn test_page_cap_bounds_results() {
        let mock_server = MockServer::start().await;

        let mut root_html = String::from("<html><body>");
        for i in 1..=10 {
            root_html.push_str(&format!(r#"<a href="/page{}">Page {}</a>"#, i, i));
        }
        root_html.push_str("</body></html>");
        mount_html(&mock_server, "/", root_html).await;

        for i in 1..=10 {
            mount_html(
                &mock_server,
                &format!("/page{}", i),
                "<html><body>Page</body></html>".to_string(),
            )
            .await;
        }

        let crawler = Crawler::new().with_max_pages(3);
        let urls = crawler.crawl(&mock_server.uri(), 3).await;

        assert_eq!(urls.len(), 3);
        assert!(urls.iter().all(|url| url.starts_with(&mock_server.uri())));
    }

    #[tokio::test]
    async fn test_failed_page_is_kept_but_not_followed() {
        let mock_server = MockServer::start().await;
        let root = mock_server.uri();

        mount_html(
            &mock_server,
            "/",
            r#"<html><body><a href="/broken">Broken</a><a href="/ok">Ok</a></body></html>"#
                .to_string(),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(
                ResponseTemplate::new(500)
                    .insert_header("content-type", "text/html")
                    .set_body_bytes(r#"<a href="/hidden">Hidden</a>"#.as_bytes()),
            )
            .mount(&mock_server)
            .await;
        mount_html(&mock_server, "/ok", "<html><body>fine</body></html>".to_string()).await;

        let pages = Crawler::new().crawl_pages(&root, 3).await;
        let urls: Vec<&str> = pages.iter().map(|p| p.url.as_str()).collect();

        assert_eq!(
            urls,
            vec![
                root.as_str(),
                format!("{}/broken", root).as_str(),
                format!("{}/ok", root).as_str(),
            ]
        );
        assert_eq!(pages[1].status_code, 500);
        assert!(pages[1].is_error());
        assert!(pages[1].links_found.is_empty());
        assert!(!pages[2].is_error());
    }

    #[tokio::test]
    async fn test_non_html_pages_are_not_parsed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_bytes(r#"{"html": "<a href=\"/x\">x</a>"}"#.as_bytes()),
            )
            .mount(&mock_server)
            .await;

        let pages = Crawler::new().crawl_pages(&mock_server.uri(), 2).await;

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].content_type.as_deref(), Some("application/json"));
        assert!(pages[0].links_found.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_start_url_returns_empty() {
        let crawler = Crawler::new();
        assert!(crawler.crawl("", 2).await.is_empty());
        assert!(crawler.crawl("http://", 2).await.is_empty());
        assert!(crawler.crawl("not a url", 2).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_returns_empty() {
        let crawler = Crawler::new().with_timeout(Duration::from_secs(2));
        assert!(crawler.crawl("http://127.0.0.1:1", 2).await.is_empty());
    }

    #[tokio::test]
    async fn test_progress_callback_sees_every_visit() {
        let mock_server = MockServer::start().await;

        mount_html(
            &mock_server,
            "/",
            r#"<html><body><a href="/one">1</a><a href="/two">2</a></body></html>"#.to_string(),
        )
        .await;
        mount_html(&mock_server, "/one", "<html></html>".to_string()).await;
        mount_html(&mock_server, "/two", "<html></html>".to_string()).await;

        let seen: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let crawler = Crawler::new().with_progress_callback(Arc::new(move |count, url| {
            seen_clone.lock().unwrap().push((count, url));
        }));

        let urls = crawler.crawl(&mock_server.uri(), 1).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), urls.len());
        assert_eq!(seen.iter().map(|(count, _)| *count).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(seen[0].1, mock_server.uri());
    }

    #[tokio::test]
    async fn test_links_resolve_against_base_element() {
        let mock_server = MockServer::start().await;
        let root = mock_server.uri();

        mount_html(
            &mock_server,
            "/",
            format!(
                r#"<html><head><base href="{}/docs/"></head>
                    <body><a href="guide">Guide</a></body></html>"#,
                root
            ),
        )
        .await;
        mount_html(&mock_server, "/docs/guide", "<html></html>".to_string()).await;

        let urls = Crawler::new().crawl(&root, 1).await;

        assert_eq!(urls, vec![root.clone(), format!("{}/docs/guide", root)]);
    }

    #[test]
    fn test_extract_links_uses_relative_base() {
        let page = Url::parse("http://example.com/a/index.html").unwrap();
        let html = r#"<base href="/b/"><a href="c">c</a><a href="/d">d</a>"#;
        assert_eq!(
            Crawler::extract_links(html, &page),
            vec!["http://example.com/b/c".to_string(), "http://example.com/d".to_string()]
        );
    }

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("http://example.com/docs/index.html").unwrap();
        assert_eq!(
            Crawler::resolve_url(&base, "guide/"),
            Some("http://example.com/docs/guide".to_string())
        );
        assert_eq!(
            Crawler::resolve_url(&base, "/about#team"),
            Some("http://example.com/about".to_string())
        );
        assert_eq!(Crawler::resolve_url(&base, "mailto:a@b.c"), None);
        assert_eq!(Crawler::resolve_url(&base, "   "), None);
    }
}
