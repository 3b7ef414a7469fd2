//! HTTP fetcher for the NTP server catalog page
//!
//! The catalog is a single public HTML page. This fetcher performs one GET
//! per pipeline run with:
//! - User-Agent rotation over a pool of browser strings
//! - Automatic retry with exponential backoff on transient server errors
//! - Explicit UTF-8 decoding of the response body

use crate::utils::error::FetchError;
use encoding_rs::UTF_8;
use rand::seq::SliceRandom;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT},
    Client, Response,
};
use std::time::Duration;

/// Pool of realistic User-Agent strings for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
];

/// Default request timeout for the catalog GET
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Catalog page fetcher
///
/// A fetch failure here is fatal to the discovery stage; every later stage
/// degrades per item instead.
pub struct CatalogFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Catalog page URL
    url: String,

    /// Maximum number of retry attempts for transient failures
    max_retries: u32,

    /// Base delay in milliseconds for exponential backoff
    base_delay_ms: u64,
}

impl CatalogFetcher {
    /// Create a new fetcher for the given catalog URL with default settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(url: &str) -> Result<Self, FetchError> {
        Self::with_config(url, DEFAULT_TIMEOUT, 2)
    }

    /// Create a new fetcher with custom timeout and retry budget
    ///
    /// # Arguments
    ///
    /// * `url` - Catalog page URL
    /// * `timeout` - Request timeout duration
    /// * `max_retries` - Maximum number of retry attempts
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(url: &str, timeout: Duration, max_retries: u32) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            url: url.to_string(),
            max_retries,
            base_delay_ms: 500,
        })
    }

    /// Fetch the catalog page with retry logic
    ///
    /// Retries are internal transport hardening; the caller sees a single
    /// success or a single failure.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::ServerError` for non-retryable statuses,
    /// `FetchError::MaxRetriesExceeded` when the retry budget runs out, and
    /// `FetchError::Timeout`/`FetchError::Http` on transport failures.
    pub async fn fetch(&self) -> Result<String, FetchError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay_ms * 2_u64.pow(attempt - 1);
                tracing::debug!(attempt, delay_ms = delay, "Retrying catalog fetch");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let headers = self.build_headers();

            match self.client.get(&self.url).headers(headers).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return self.decode_response(response).await;
                    } else if Self::should_retry(status.as_u16()) {
                        last_error = Some(FetchError::ServerError(status.as_u16()));
                        continue;
                    } else {
                        return Err(FetchError::ServerError(status.as_u16()));
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(FetchError::Timeout);
                    } else {
                        last_error = Some(FetchError::Http(e));
                    }
                }
            }
        }

        Err(last_error.unwrap_or(FetchError::MaxRetriesExceeded))
    }

    /// Determine if a status code should trigger a retry
    ///
    /// Retry on 429 and transient 5xx; anything else fails immediately.
    fn should_retry(status: u16) -> bool {
        matches!(status, 429 | 500 | 502 | 503 | 504)
    }

    /// Decode a successful response body as UTF-8 text
    async fn decode_response(&self, response: Response) -> Result<String, FetchError> {
        let bytes = response.bytes().await?;
        self.decode_bytes(&bytes)
    }

    /// Decode raw bytes as UTF-8
    ///
    /// The catalog page declares UTF-8; replacement characters mean the body
    /// is not usable markup.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Decode` when the bytes are not valid UTF-8
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<String, FetchError> {
        let (cow, _encoding, had_errors) = UTF_8.decode(bytes);

        if had_errors {
            return Err(FetchError::Decode("UTF-8 decoding errors".to_string()));
        }

        Ok(cow.into_owned())
    }

    /// Build browser-like HTTP headers for the catalog request
    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let user_agent = self.random_user_agent();
        headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));

        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(
            ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate, br"),
        );

        headers
    }

    /// Get a random user agent from the pool
    fn random_user_agent(&self) -> &'static str {
        let mut rng = rand::thread_rng();
        USER_AGENTS.choose(&mut rng).unwrap_or(&USER_AGENTS[0])
    }

    /// The configured catalog URL
    pub fn url(&self) -> &str {
        &self.url
    }
}
