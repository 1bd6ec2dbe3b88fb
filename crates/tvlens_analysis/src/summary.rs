use crate::error::AnalysisError;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use tvlens_shared_models::MergedRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub last: f64,
}

/// Headline numbers for the rows currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub tvl: SeriesStats,
    pub price: SeriesStats,
}

impl SeriesSummary {
    pub fn compute(rows: &[MergedRow]) -> Result<Self, AnalysisError> {
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            return Err(AnalysisError::EmptySeries);
        };

        let df = DataFrame::new(vec![
            Column::new(
                "tvl_usd".into(),
                rows.iter().map(|r| r.tvl_usd).collect::<Vec<_>>(),
            ),
            Column::new(
                "price".into(),
                rows.iter().map(|r| r.price).collect::<Vec<_>>(),
            ),
        ])?;

        Ok(Self {
            rows: df.height(),
            first_date: first.date,
            last_date: last.date,
            tvl: stats(df.column("tvl_usd")?.f64()?, last.tvl_usd),
            price: stats(df.column("price")?.f64()?, last.price),
        })
    }
}

fn stats(values: &Float64Chunked, last: f64) -> SeriesStats {
    SeriesStats {
        min: values.min().unwrap_or(last),
        max: values.max().unwrap_or(last),
        mean: values.mean().unwrap_or(last),
        last,
    }
}
