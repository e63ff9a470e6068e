//! Rotating HTTP session built on reqwest.
//!
//! One reqwest client is built per proxy slot up front. Every outbound
//! request advances a shared cursor and goes out through the next slot,
//! so a single session can be shared across tasks.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use jobsift_core::error::{AppError, RETRY_STATUSES};
use jobsift_core::http::{HttpRequest, HttpResponse, Method};
use jobsift_core::traits::HttpTransport;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::{Certificate, Client, Proxy};
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "jobsift/0.1";

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Proxy entry that means "send this request directly".
pub const LOCAL_PROXY: &str = "http://localhost";

/// Fallback timeout for requests that do not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the session presents itself upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransportMode {
    /// Library user agent, no extra headers.
    #[default]
    Plain,
    /// Desktop-browser user agent and accept headers, for sources that
    /// reject obvious clients.
    Browser,
}

/// Linear backoff: the n-th retry waits `backoff * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn with_backoff(backoff: Duration) -> Self {
        Self {
            backoff,
            ..Self::default()
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub proxies: Vec<String>,
    pub ca_cert: Option<PathBuf>,
    pub accept_invalid_certs: bool,
    pub retry: Option<RetryPolicy>,
    pub clear_cookies: bool,
    pub mode: TransportMode,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proxies<I, S>(mut self, proxies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.proxies = proxies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Keep no cookies between requests.
    pub fn with_clear_cookies(mut self, clear: bool) -> Self {
        self.clear_cookies = clear;
        self
    }

    pub fn with_mode(mut self, mode: TransportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

/// Normalize a proxy entry to a URL with an explicit scheme.
///
/// `http://`, `https://`, and `socks5://` entries pass through; anything
/// else is treated as `host:port` for an HTTP proxy.
pub fn format_proxy(proxy: &str) -> String {
    let proxy = proxy.trim();
    if ["http://", "https://", "socks5://"]
        .iter()
        .any(|scheme| proxy.starts_with(scheme))
    {
        proxy.to_string()
    } else {
        format!("http://{proxy}")
    }
}

enum Slot {
    Ready(Client),
    /// Client construction failed; the error is reported when this slot
    /// is used.
    Broken(String),
}

/// An [`HttpTransport`] that rotates through proxies round-robin.
///
/// Construction never fails. A bad proxy URL or CA bundle turns its slot
/// into an error that surfaces on the first request routed through it.
pub struct RotatingSession {
    slots: Vec<Slot>,
    cursor: AtomicUsize,
    retry: Option<RetryPolicy>,
}

impl RotatingSession {
    pub fn new(config: SessionConfig) -> Self {
        let root_cert = config.ca_cert.as_ref().map(|path| load_certificate(path));

        let slots = if config.proxies.is_empty() {
            vec![build_slot(&config, None, root_cert.as_ref())]
        } else {
            config
                .proxies
                .iter()
                .map(|proxy| {
                    build_slot(&config, Some(format_proxy(proxy).as_str()), root_cert.as_ref())
                })
                .collect()
        };

        debug!(
            slots = slots.len(),
            retry = config.retry.is_some(),
            mode = ?config.mode,
            "Session ready"
        );

        Self {
            slots,
            cursor: AtomicUsize::new(0),
            retry: config.retry,
        }
    }

    /// Session with default settings and no proxies.
    pub fn plain() -> Self {
        Self::new(SessionConfig::default())
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn next_slot(&self) -> (usize, &Slot) {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        (index, &self.slots[index])
    }

    async fn send_once(
        &self,
        client: &Client,
        request: &HttpRequest,
    ) -> Result<HttpResponse, AppError> {
        let timeout = request.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let mut builder = match request.method {
            Method::Get => client.get(&request.url),
            Method::Post => client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.json {
            builder = builder.json(body);
        }

        let response = builder
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_send_error(e, timeout))?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Http(format!("Failed to read response body: {e}")))?;

        Ok(HttpResponse::new(status, url, body))
    }
}

impl HttpTransport for RotatingSession {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, AppError> {
        let (index, slot) = self.next_slot();
        let client = match slot {
            Slot::Ready(client) => client,
            Slot::Broken(reason) => {
                return Err(AppError::Config(format!(
                    "session slot {index} unusable: {reason}"
                )));
            }
        };

        let max_retries = self.retry.map_or(0, |policy| policy.max_retries);
        let mut attempt = 0;
        loop {
            let result = self.send_once(client, &request).await;
            let retryable = match &result {
                Ok(response) => RETRY_STATUSES.contains(&response.status),
                Err(e) => e.is_retryable(),
            };
            if !retryable || attempt >= max_retries {
                return result;
            }

            attempt += 1;
            let delay = self.retry.map(|policy| policy.delay(attempt)).unwrap_or_default();
            match &result {
                Ok(response) => warn!(
                    url = %request.url,
                    status = response.status,
                    attempt,
                    "Retrying after error status"
                ),
                Err(e) => warn!(
                    url = %request.url,
                    error = %e,
                    attempt,
                    "Retrying after transport error"
                ),
            }
            tokio::time::sleep(delay).await;
        }
    }
}

fn load_certificate(path: &Path) -> Result<Certificate, String> {
    let pem = std::fs::read(path)
        .map_err(|e| format!("cannot read CA bundle {}: {e}", path.display()))?;
    Certificate::from_pem(&pem).map_err(|e| format!("invalid CA bundle {}: {e}", path.display()))
}

fn build_slot(
    config: &SessionConfig,
    proxy: Option<&str>,
    root_cert: Option<&Result<Certificate, String>>,
) -> Slot {
    match build_client(config, proxy, root_cert) {
        Ok(client) => Slot::Ready(client),
        Err(reason) => {
            warn!(proxy = proxy.unwrap_or("none"), %reason, "Session slot unusable");
            Slot::Broken(reason)
        }
    }
}

fn build_client(
    config: &SessionConfig,
    proxy: Option<&str>,
    root_cert: Option<&Result<Certificate, String>>,
) -> Result<Client, String> {
    let mut builder = Client::builder();

    builder = match config.mode {
        TransportMode::Plain => builder.user_agent(DEFAULT_USER_AGENT),
        TransportMode::Browser => builder
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(browser_headers()),
    };

    if !config.clear_cookies {
        builder = builder.cookie_store(true);
    }

    match proxy {
        Some(LOCAL_PROXY) => builder = builder.no_proxy(),
        Some(proxy_url) => {
            Url::parse(proxy_url).map_err(|e| format!("invalid proxy {proxy_url}: {e}"))?;
            let proxy =
                Proxy::all(proxy_url).map_err(|e| format!("invalid proxy {proxy_url}: {e}"))?;
            builder = builder.proxy(proxy);
        }
        None => {}
    }

    if let Some(cert) = root_cert {
        builder = builder.add_root_certificate(cert.clone()?);
    }
    if config.accept_invalid_certs {
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().map_err(|e| e.to_string())
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

fn map_send_error(e: reqwest::Error, timeout: Duration) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(timeout.as_secs())
    } else if e.is_connect() {
        AppError::Network(format!("Connection failed: {e}"))
    } else {
        AppError::Http(e.to_string())
    }
}
