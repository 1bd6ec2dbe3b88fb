use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Protocol TVL for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvlPoint {
    pub date: NaiveDate,
    pub tvl_usd: f64,
}

impl TvlPoint {
    pub fn new(date: NaiveDate, tvl_usd: f64) -> Self {
        Self { date, tvl_usd }
    }
}

/// Daily OHLCV candle, keyed by the UTC day it opened on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One aligned day of the merged series. `price` is the candle close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub date: NaiveDate,
    pub tvl_usd: f64,
    pub price: f64,
}

impl MergedRow {
    pub fn new(date: NaiveDate, tvl_usd: f64, price: f64) -> Self {
        Self {
            date,
            tvl_usd,
            price,
        }
    }
}
