mod config;
mod pipeline;

use anyhow::Context;
use clap::Parser;
use config::Args;
use dotenv::dotenv;
use log::info;
use tvlens_http::{ApiClient, BrowserClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!(
        "Collecting {} TVL and {} prices into {}",
        args.protocol,
        args.pair,
        args.output.display()
    );

    let tvl_http =
        BrowserClient::new(args.challenge_settings()).context("Failed to build page client")?;
    let price_http =
        ApiClient::new(args.request_timeout()).context("Failed to build exchange client")?;

    let summary = pipeline::collect(tvl_http, price_http, &args, None).await?;

    info!(
        "Merged {} rows ({} .. {}) from {} TVL points and {} daily prices",
        summary.merged_rows,
        summary.first_date,
        summary.last_date,
        summary.tvl_points,
        summary.price_points
    );

    Ok(())
}
