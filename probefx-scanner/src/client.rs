use crate::error::{Result, ScanError};
use crate::normalize::with_default_scheme;
use crate::transaction::{HttpHeaders, HttpMethod, HttpResponse};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "ProbeFX/1.0";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends single HTTP requests and buffers the complete response.
///
/// No retries and no caching: every call is one request, and any network
/// failure is returned as [`ScanError::Transport`].
#[derive(Clone)]
pub struct TransactionClient {
    client: Client,
}

impl TransactionClient {
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT)
    }

    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }

    pub async fn send(
        &self,
        url: &str,
        method: HttpMethod,
        headers: &HttpHeaders,
        body: Option<&str>,
    ) -> Result<HttpResponse> {
        if url.trim().is_empty() {
            return Err(ScanError::InvalidInput("URL cannot be empty".to_string()));
        }

        let target = with_default_scheme(url);
        let parsed = Url::parse(&target)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", target, e)))?;

        debug!("Sending {} request to {}", method, parsed);

        let mut request = self.client.request(method.to_reqwest(), parsed);
        for (name, value) in headers.iter() {
            request = request.header(name, value);
        }
        if method.carries_body()
            && let Some(body) = body
        {
            request = request.body(body.to_string());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                ScanError::InvalidInput(format!("Malformed request: {}", e))
            } else {
                ScanError::Transport(e)
            }
        })?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let response_headers = HttpHeaders::from(response.headers());
        let body = response.text().await?;

        debug!("Received status {} from {}", status_code, final_url);

        Ok(HttpResponse {
            url: final_url,
            status_code,
            headers: response_headers,
            body,
        })
    }
}
