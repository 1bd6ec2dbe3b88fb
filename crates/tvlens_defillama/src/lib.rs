pub mod next_data;

use log::info;
use tvlens_http::{HttpClient, RetryPolicy, SourceError};
use tvlens_shared_models::TvlPoint;

pub const BASE_URL: &str = "https://defillama.com/protocol";

/// Reads a protocol's daily TVL history off its public DefiLlama page.
pub struct DefiLlamaClient<C> {
    http: C,
    base_url: String,
    retry: RetryPolicy,
}

impl<C: HttpClient> DefiLlamaClient<C> {
    pub fn new(http: C) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn protocol_url(&self, protocol_slug: &str) -> String {
        format!("{}/{}", self.base_url, protocol_slug)
    }

    /// One entry per calendar day (UTC), ascending. Transient network failures
    /// and challenge pages are retried; a page without the embedded chart
    /// data fails immediately.
    pub async fn fetch_tvl(&self, protocol_slug: &str) -> Result<Vec<TvlPoint>, SourceError> {
        let url = self.protocol_url(protocol_slug);
        let label = format!("defillama {protocol_slug}");

        let http = &self.http;
        let target = url.as_str();
        let page = self.retry.run(&label, move || http.get(target)).await?;

        let points = next_data::parse_tvl_page(&page)?;

        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            info!(
                "Fetched {} TVL points for {protocol_slug} ({} .. {})",
                points.len(),
                first.date,
                last.date
            );
        }

        Ok(points)
    }
}
