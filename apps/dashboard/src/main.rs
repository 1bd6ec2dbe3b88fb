mod render;
mod session;

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use log::info;
use session::Session;
use std::io::{self, Write};
use std::path::PathBuf;
use tvlens_analysis::Timeframe;
use tvlens_store::MergedStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Explore how protocol TVL and token price move together", long_about = None)]
struct Args {
    /// Merged CSV written by the collector
    #[arg(long, env = "TVLENS_DATA", default_value = tvlens_store::DEFAULT_ARTIFACT)]
    data: PathBuf,

    /// Days between a TVL reading and the price it is compared with
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    lag: i64,

    /// Range to analyse: 1w, 1m, 3m, 6m, ytd, 1y or all
    #[arg(long, default_value = "all")]
    range: Timeframe,

    /// Where `chart` writes the HTML chart
    #[arg(long, default_value = "tvl_vs_price.html")]
    chart: PathBuf,

    /// Print the report and exit instead of starting the session
    #[arg(long)]
    once: bool,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let rows = MergedStore::new(&args.data)
        .load()
        .with_context(|| format!("Failed to load {}", args.data.display()))?;
    info!("Loaded {} rows from {}", rows.len(), args.data.display());

    let mut session = Session::new(rows, args.lag, args.range, args.chart);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.once {
        write!(out, "{}", session.report())?;
        return Ok(());
    }

    session.run(io::stdin().lock(), &mut out)?;
    out.flush()?;

    Ok(())
}
