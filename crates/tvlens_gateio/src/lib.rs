pub mod candlesticks;
pub mod method;

use candlesticks::{Candlesticks, CandlesticksParams, GateCandle, Interval};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use method::Method;
use std::time::Duration;
use tvlens_http::{FetchError, HttpClient, RetryPolicy, SourceError};
use tvlens_shared_models::{ParseError, PricePoint};
use url::Url;

pub const BASE_URL: &str = "https://api.gateio.ws/api/v4";
/// Largest number of candles Gate returns for one request.
pub const MAX_PAGE_LIMIT: u32 = 1000;

const DAY_SECS: i64 = 86_400;

pub struct GateioClient<C> {
    http: C,
    base_url: String,
    retry: RetryPolicy,
    page_limit: u32,
    page_delay: Duration,
    until: Option<NaiveDate>,
}

impl<C: HttpClient> GateioClient<C> {
    pub fn new(http: C) -> Self {
        Self {
            http,
            base_url: BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            page_limit: MAX_PAGE_LIMIT,
            page_delay: Duration::from_millis(200),
            until: None,
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

    /// Clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Last day to fetch; defaults to today (UTC).
    pub fn with_until(mut self, until: NaiveDate) -> Self {
        self.until = Some(until);
        self
    }

    pub fn endpoint<M: Method>(&self, params: &M::Params) -> Result<Url, FetchError> {
        let raw = M::url(&self.base_url);
        let invalid = |reason: String| FetchError::InvalidUrl {
            url: raw.clone(),
            reason,
        };

        let mut url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
        let query = serde_json::to_value(params).map_err(|e| invalid(e.to_string()))?;

        if let serde_json::Value::Object(fields) = query {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in fields {
                match value {
                    serde_json::Value::Null => {}
                    serde_json::Value::String(s) => {
                        pairs.append_pair(&key, &s);
                    }
                    other => {
                        pairs.append_pair(&key, &other.to_string());
                    }
                }
            }
        }

        Ok(url)
    }

    pub async fn call<M: Method>(&self, params: M::Params) -> Result<M::Response, SourceError> {
        let url = self.endpoint::<M>(&params)?;
        let label = format!("gateio {}", M::PATH);

        let http = &self.http;
        let target = url.as_str();
        let body = self.retry.run(&label, move || http.get(target)).await?;

        serde_json::from_str(&body)
            .map_err(|e| ParseError::new("gateio", M::PATH, e).into())
    }

    /// Daily closes for `pair` from `start_date` through today (or the
    /// configured end date), one per day, ascending.
    ///
    /// Walks forward in windows of `page_limit` days, restarting each page
    /// one second after the newest candle seen. A short page resumes after
    /// its window, so gaps in the exchange data do not end the walk; only an
    /// empty page after data has started or reaching the end date does.
    pub async fn fetch_price_history(
        &self,
        pair: &str,
        start_date: NaiveDate,
    ) -> Result<Vec<PricePoint>, SourceError> {
        let end = self.until.unwrap_or_else(|| Utc::now().date_naive());
        let end_ts = day_start(end);
        let limit = i64::from(self.page_limit);
        let window = limit * DAY_SECS;

        let mut since = day_start(start_date);
        let mut candles: Vec<GateCandle> = Vec::new();
        let mut pages = 0u32;

        while since <= end_ts {
            let to = since + window - 1;
            let params = CandlesticksParams::builder()
                .currency_pair(pair)
                .interval(Interval::Day)
                .from_ts(since)
                .to_ts(to)
                .build();

            let page = self.call::<Candlesticks>(params).await?;
            pages += 1;
            debug!("{pair} page {pages}: {} candles from {since}", page.len());

            let Some(last_ts) = page.iter().map(|c| c.timestamp).max() else {
                if candles.is_empty() && since + window <= end_ts {
                    // Nothing listed yet in this window, keep walking forward.
                    since += window;
                    self.pause().await;
                    continue;
                }
                break;
            };

            let page_len = page.len() as i64;
            candles.extend(page);

            if date_of(last_ts) >= end {
                break;
            }
            if page_len < limit && date_of(last_ts) < date_of(to) {
                // Missing days inside the window, not necessarily the end of
                // the series: resume after the window.
                if to >= end_ts {
                    break;
                }
                since = to + 1;
                self.pause().await;
                continue;
            }

            let next = last_ts + 1;
            if next <= since {
                warn!("{pair}: pagination did not advance past {since}, stopping");
                break;
            }
            since = next;
            self.pause().await;
        }

        let points = into_price_points(candles, end);
        info!("Fetched {} daily prices for {pair} in {pages} pages", points.len());

        Ok(points)
    }

    async fn pause(&self) {
        if !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }
    }
}

/// Sorted by date, first candle wins on duplicate days, nothing past `end`.
fn into_price_points(candles: Vec<GateCandle>, end: NaiveDate) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = candles
        .into_iter()
        .filter_map(|c| {
            let date = DateTime::from_timestamp(c.timestamp, 0)?.date_naive();
            let volume = c.base_volume.unwrap_or(if c.close > 0.0 {
                c.quote_volume / c.close
            } else {
                0.0
            });

            Some(PricePoint {
                date,
                open: c.open,
                high: c.high,
                low: c.low,
                close: c.close,
                volume,
            })
        })
        .filter(|p| p.date <= end)
        .collect();

    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);
    points
}

fn day_start(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn date_of(ts: i64) -> NaiveDate {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.date_naive())
        .unwrap_or(NaiveDate::MAX)
}
