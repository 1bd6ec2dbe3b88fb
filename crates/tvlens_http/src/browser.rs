use crate::{FetchError, HttpClient};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, UPGRADE_INSECURE_REQUESTS, USER_AGENT};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const CHALLENGE_MARKERS: [&str; 5] = [
    "cf-browser-verification",
    "challenge-platform",
    "cf_chl_opt",
    "Just a moment...",
    "Attention Required! | Cloudflare",
];

#[derive(Debug, Clone)]
pub struct ChallengeSettings {
    /// How many times a challenged request is replayed before giving up.
    pub attempts: u32,
    /// Wait between replays, giving the interstitial time to clear.
    pub delay: Duration,
    pub timeout: Duration,
}

impl Default for ChallengeSettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(10),
            timeout: crate::DEFAULT_TIMEOUT,
        }
    }
}

/// HTML client that looks like a desktop browser and keeps cookies between
/// requests, so a challenge cookie handed out on the first response is sent
/// back on the replay.
pub struct BrowserClient {
    reqwest: Client,
    settings: ChallengeSettings,
}

impl BrowserClient {
    pub fn new(settings: ChallengeSettings) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let reqwest = ClientBuilder::new()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(settings.timeout)
            .build()
            .map_err(FetchError::Build)?;

        Ok(Self { reqwest, settings })
    }
}

#[async_trait]
impl HttpClient for BrowserClient {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let attempts = self.settings.attempts.max(1);

        for attempt in 1..=attempts {
            debug!("GET {url} (browser, attempt {attempt}/{attempts})");

            let response = self
                .reqwest
                .get(url)
                .send()
                .await
                .map_err(|e| FetchError::from_reqwest(url, e))?;

            let status = response.status();
            let mitigated = response.headers().contains_key("cf-mitigated");
            let body = response.text().await.map_err(|source| FetchError::Body {
                url: url.to_string(),
                source,
            })?;

            if is_challenge(status, mitigated, &body) {
                if attempt < attempts {
                    info!(
                        "Challenge page at {url}, waiting {:?} before replaying",
                        self.settings.delay
                    );
                    tokio::time::sleep(self.settings.delay).await;
                }
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            return Ok(body);
        }

        warn!("Challenge at {url} still present after {attempts} attempts");
        Err(FetchError::Challenge {
            url: url.to_string(),
            attempts,
        })
    }
}

/// Detects an anti-bot interstitial instead of the real page.
pub fn is_challenge(status: StatusCode, mitigated: bool, body: &str) -> bool {
    if mitigated {
        return true;
    }

    matches!(status.as_u16(), 403 | 429 | 503)
        && CHALLENGE_MARKERS.iter().any(|marker| body.contains(marker))
}
