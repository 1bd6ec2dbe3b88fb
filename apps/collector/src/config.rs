use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tvlens_http::{ChallengeSettings, RetryPolicy};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Fetch protocol TVL and token prices, merge them by day and save the CSV", long_about = None)]
pub struct Args {
    /// DefiLlama protocol slug
    #[arg(long, env = "TVLENS_PROTOCOL", default_value = "aave")]
    pub protocol: String,

    #[arg(long, env = "TVLENS_TVL_BASE_URL", default_value = tvlens_defillama::BASE_URL)]
    pub tvl_base_url: String,

    /// Exchange currency pair (e.g. AAVE_USDT)
    #[arg(long, env = "TVLENS_PAIR", default_value = "AAVE_USDT")]
    pub pair: String,

    #[arg(long, env = "TVLENS_EXCHANGE_BASE_URL", default_value = tvlens_gateio::BASE_URL)]
    pub exchange_base_url: String,

    /// Where the merged CSV is written
    #[arg(long, env = "TVLENS_OUTPUT", default_value = tvlens_store::DEFAULT_ARTIFACT)]
    pub output: PathBuf,

    /// Candles per exchange request (max 1000)
    #[arg(long, env = "TVLENS_PAGE_LIMIT", default_value_t = tvlens_gateio::MAX_PAGE_LIMIT)]
    pub page_limit: u32,

    /// Attempts per request before a transient failure becomes fatal
    #[arg(long, env = "TVLENS_MAX_ATTEMPTS", default_value_t = 3)]
    pub max_attempts: u32,

    #[arg(long, env = "TVLENS_BACKOFF_MS", default_value_t = 500)]
    pub backoff_ms: u64,

    #[arg(long, env = "TVLENS_CHALLENGE_DELAY_SECS", default_value_t = 10)]
    pub challenge_delay_secs: u64,

    #[arg(long, env = "TVLENS_CHALLENGE_ATTEMPTS", default_value_t = 3)]
    pub challenge_attempts: u32,

    /// Pause between exchange pages
    #[arg(long, env = "TVLENS_PAGE_DELAY_MS", default_value_t = 200)]
    pub page_delay_ms: u64,

    #[arg(long, env = "TVLENS_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// First price date (YYYY-MM-DD); defaults to the oldest TVL date
    #[arg(long, env = "TVLENS_START_DATE")]
    pub start_date: Option<NaiveDate>,
}

impl Args {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.backoff_ms))
    }

    pub fn challenge_settings(&self) -> ChallengeSettings {
        ChallengeSettings {
            attempts: self.challenge_attempts,
            delay: Duration::from_secs(self.challenge_delay_secs),
            timeout: self.request_timeout(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}
