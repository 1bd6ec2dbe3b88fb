pub mod browser;
pub mod error;
pub mod retry;

pub use browser::{BrowserClient, ChallengeSettings};
pub use error::{FetchError, SourceError};
pub use retry::RetryPolicy;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The one thing the fetchers need from the network: a URL in, a body out.
///
/// Implemented by [`ApiClient`] and [`BrowserClient`]; tests swap in mocks so
/// the pipeline never touches the real network.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain JSON client for public market-data endpoints.
pub struct ApiClient {
    reqwest: Client,
}

impl ApiClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("tvlens/", env!("CARGO_PKG_VERSION"))),
        );

        let reqwest = ClientBuilder::new()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Build)?;

        Ok(Self { reqwest })
    }
}

#[async_trait]
impl HttpClient for ApiClient {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {url}");

        let response = self
            .reqwest
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}
