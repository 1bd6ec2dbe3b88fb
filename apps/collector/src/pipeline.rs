use crate::config::Args;
use anyhow::{Context, bail};
use chrono::NaiveDate;
use log::info;
use tvlens_analysis::merge;
use tvlens_defillama::DefiLlamaClient;
use tvlens_gateio::GateioClient;
use tvlens_http::HttpClient;
use tvlens_shared_models::MergedRow;
use tvlens_store::MergedStore;

/// Used when the TVL history is empty and no start date was given.
pub const FALLBACK_START: (i32, u32, u32) = (2020, 1, 1);

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub tvl_points: usize,
    pub price_points: usize,
    pub merged_rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

/// Fetch TVL, fetch prices from the oldest TVL date, merge and save.
///
/// Each client is consumed by its fetcher and dropped as soon as that fetch
/// returns. `until` pins the last price date; `None` means today.
pub async fn collect<T, P>(
    tvl_http: T,
    price_http: P,
    args: &Args,
    until: Option<NaiveDate>,
) -> anyhow::Result<RunSummary>
where
    T: HttpClient,
    P: HttpClient,
{
    let tvl = {
        let client = DefiLlamaClient::new(tvl_http)
            .with_base_url(args.tvl_base_url.as_str())
            .with_retry(args.retry_policy());
        client
            .fetch_tvl(&args.protocol)
            .await
            .with_context(|| format!("Failed to fetch TVL for {}", args.protocol))?
    };

    let start = args
        .start_date
        .or_else(|| tvl.first().map(|p| p.date))
        .or_else(|| {
            let (y, m, d) = FALLBACK_START;
            NaiveDate::from_ymd_opt(y, m, d)
        })
        .context("No start date for the price history")?;

    let prices = {
        let mut client = GateioClient::new(price_http)
            .with_base_url(args.exchange_base_url.as_str())
            .with_retry(args.retry_policy())
            .with_page_limit(args.page_limit)
            .with_page_delay(args.page_delay());
        if let Some(until) = until {
            client = client.with_until(until);
        }
        client
            .fetch_price_history(&args.pair, start)
            .await
            .with_context(|| format!("Failed to fetch {} prices from {start}", args.pair))?
    };

    let rows = merge(&tvl, &prices);
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        bail!(
            "TVL ({} points) and prices ({} points) share no dates; keeping the previous file",
            tvl.len(),
            prices.len()
        );
    };

    MergedStore::new(&args.output)
        .save(&rows)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    log_edges(&rows);

    Ok(RunSummary {
        tvl_points: tvl.len(),
        price_points: prices.len(),
        merged_rows: rows.len(),
        first_date: first.date,
        last_date: last.date,
    })
}

fn log_edges(rows: &[MergedRow]) {
    const EDGE: usize = 3;

    for row in rows.iter().take(EDGE) {
        info!("  {} tvl={:.2} price={:.4}", row.date, row.tvl_usd, row.price);
    }
    if rows.len() > 2 * EDGE {
        info!("  ...");
    }
    for row in rows.iter().skip(rows.len().saturating_sub(EDGE).max(EDGE)) {
        info!("  {} tvl={:.2} price={:.4}", row.date, row.tvl_usd, row.price);
    }
}
