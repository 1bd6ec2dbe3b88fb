use crate::error::AnalysisError;
use chrono::{NaiveDate, TimeDelta};
use log::debug;
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use tvlens_shared_models::MergedRow;

/// Lags shown in every summary, in days.
pub const STANDARD_LAGS: [i64; 4] = [0, 1, 7, 30];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub lag_days: i64,
    pub coefficient: f64,
    pub sample_size: usize,
}

/// `(tvl[d], price[d + lag_days])` for every date where both exist.
///
/// The shift is by calendar date, so a gap in the series drops the pair
/// instead of pairing two days that are further apart than `lag_days`.
pub fn lagged_pairs(rows: &[MergedRow], lag_days: i64) -> Vec<(f64, f64)> {
    let Some(shift) = TimeDelta::try_days(lag_days) else {
        return Vec::new();
    };
    let price_by_date: HashMap<NaiveDate, f64> = rows.iter().map(|r| (r.date, r.price)).collect();

    rows.iter()
        .filter_map(|r| {
            let target = r.date.checked_add_signed(shift)?;
            price_by_date.get(&target).map(|price| (r.tvl_usd, *price))
        })
        .collect()
}

/// Pearson correlation between TVL and the price `lag_days` later.
pub fn correlate(rows: &[MergedRow], lag_days: i64) -> Result<CorrelationResult, AnalysisError> {
    let pairs = lagged_pairs(rows, lag_days);
    let samples = pairs.len();
    if samples < 2 {
        return Err(AnalysisError::InsufficientData { lag_days, samples });
    }

    let (tvl, price): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
    let tvl = Float64Chunked::from_vec("tvl_usd".into(), tvl);
    let price = Float64Chunked::from_vec("price".into(), price);

    let coefficient = pearson_correlation(&tvl, &price)?
        .ok_or(AnalysisError::ConstantSeries { lag_days, samples })?;
    debug!("lag {lag_days}d: r = {coefficient:.4} over {samples} samples");

    Ok(CorrelationResult {
        lag_days,
        coefficient,
        sample_size: samples,
    })
}

/// `None` when either series has zero variance.
fn pearson_correlation(
    s1: &ChunkedArray<Float64Type>,
    s2: &ChunkedArray<Float64Type>,
) -> Result<Option<f64>, PolarsError> {
    let len = s1.len();

    if len != s2.len() {
        return Err(PolarsError::ShapeMismatch(
            format!("Series lengths don't match: {} vs {}", len, s2.len()).into(),
        ));
    }

    let mean1 = s1.mean().unwrap_or(0.0);
    let mean2 = s2.mean().unwrap_or(0.0);

    let mut numerator = 0.0;
    let mut denom1 = 0.0;
    let mut denom2 = 0.0;

    for i in 0..len {
        let (Some(v1), Some(v2)) = (s1.get(i), s2.get(i)) else {
            continue;
        };

        let diff1 = v1 - mean1;
        let diff2 = v2 - mean2;

        numerator += diff1 * diff2;
        denom1 += diff1 * diff1;
        denom2 += diff2 * diff2;
    }

    if denom1 == 0.0 || denom2 == 0.0 {
        return Ok(None);
    }

    let correlation = numerator / (denom1.sqrt() * denom2.sqrt());

    Ok(Some(correlation.clamp(-1.0, 1.0)))
}
