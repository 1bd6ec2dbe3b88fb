use chrono::{Datelike, Days, NaiveDate};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tvlens_shared_models::MergedRow;

/// Trailing window of the merged series the dashboard looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    YearToDate,
    OneYear,
    #[default]
    All,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown range `{0}` (expected one of 1w, 1m, 3m, 6m, ytd, 1y, all)")]
pub struct ParseTimeframeError(String);

impl Timeframe {
    pub const ALL: [Timeframe; 7] = [
        Timeframe::OneWeek,
        Timeframe::OneMonth,
        Timeframe::ThreeMonths,
        Timeframe::SixMonths,
        Timeframe::YearToDate,
        Timeframe::OneYear,
        Timeframe::All,
    ];

    fn days(&self) -> Option<u64> {
        match self {
            Timeframe::OneWeek => Some(7),
            Timeframe::OneMonth => Some(30),
            Timeframe::ThreeMonths => Some(90),
            Timeframe::SixMonths => Some(180),
            Timeframe::OneYear => Some(365),
            Timeframe::YearToDate | Timeframe::All => None,
        }
    }

    /// First date of the window over a series spanning `first..=last`,
    /// never earlier than `first`.
    pub fn start_date(&self, first: NaiveDate, last: NaiveDate) -> NaiveDate {
        let start = match self {
            Timeframe::All => first,
            Timeframe::YearToDate => NaiveDate::from_ymd_opt(last.year(), 1, 1).unwrap_or(first),
            _ => self
                .days()
                .and_then(|days| last.checked_sub_days(Days::new(days)))
                .unwrap_or(first),
        };

        start.max(first)
    }

    /// The rows of an ascending series that fall inside the window.
    pub fn slice<'a>(&self, rows: &'a [MergedRow]) -> &'a [MergedRow] {
        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            return rows;
        };

        let start = self.start_date(first.date, last.date);
        let from = rows.partition_point(|r| r.date < start);
        &rows[from..]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Timeframe::OneWeek => "1w",
            Timeframe::OneMonth => "1m",
            Timeframe::ThreeMonths => "3m",
            Timeframe::SixMonths => "6m",
            Timeframe::YearToDate => "ytd",
            Timeframe::OneYear => "1y",
            Timeframe::All => "all",
        };
        f.write_str(label)
    }
}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.to_string() == wanted)
            .ok_or_else(|| ParseTimeframeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(first: NaiveDate, days: u64) -> Vec<MergedRow> {
        (0..days)
            .map(|i| MergedRow::new(first + Days::new(i), i as f64, i as f64))
            .collect()
    }

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("1w".parse::<Timeframe>(), Ok(Timeframe::OneWeek));
        assert_eq!("YTD".parse::<Timeframe>(), Ok(Timeframe::YearToDate));
        assert_eq!(" all ".parse::<Timeframe>(), Ok(Timeframe::All));
        assert!("2w".parse::<Timeframe>().is_err());

        for tf in Timeframe::ALL {
            assert_eq!(tf.to_string().parse::<Timeframe>(), Ok(tf));
        }
    }

    #[test]
    fn windows_count_back_from_the_last_date() {
        let first = date(2023, 1, 1);
        let last = date(2024, 6, 30);

        assert_eq!(Timeframe::OneWeek.start_date(first, last), date(2024, 6, 23));
        assert_eq!(Timeframe::OneMonth.start_date(first, last), date(2024, 5, 31));
        assert_eq!(Timeframe::YearToDate.start_date(first, last), date(2024, 1, 1));
        assert_eq!(Timeframe::OneYear.start_date(first, last), date(2023, 7, 1));
        assert_eq!(Timeframe::All.start_date(first, last), first);
    }

    #[test]
    fn windows_never_start_before_the_data() {
        let first = date(2024, 6, 1);
        let last = date(2024, 6, 30);

        assert_eq!(Timeframe::SixMonths.start_date(first, last), first);
        assert_eq!(Timeframe::YearToDate.start_date(first, last), first);
    }

    #[test]
    fn slice_keeps_the_trailing_rows() {
        let rows = daily(date(2024, 1, 1), 60);

        let week = Timeframe::OneWeek.slice(&rows);
        assert_eq!(week.len(), 8);
        assert_eq!(week.last(), rows.last());

        assert_eq!(Timeframe::All.slice(&rows).len(), 60);
        assert!(Timeframe::OneMonth.slice(&[]).is_empty());
    }
}
