pub mod error;
pub mod operations;

pub use error::StoreError;
pub use operations::MergedStore;

/// File name the collector writes and the dashboard reads by default.
pub const DEFAULT_ARTIFACT: &str = "aave_tvl_vs_price_merged.csv";

pub const HEADER: [&str; 3] = ["date", "tvl_usd", "price"];
