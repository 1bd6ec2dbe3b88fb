use prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE;
use prettytable::{Table, row};
use tvlens_analysis::interpretation::{describe, gauge, interpret};
use tvlens_analysis::summary::SeriesSummary;
use tvlens_analysis::{AnalysisError, STANDARD_LAGS, Timeframe, correlate};
use tvlens_shared_models::MergedRow;

const GAUGE_HALF_WIDTH: usize = 10;

/// Standard lags, plus `selected` when it is not one of them.
pub fn lags_for(selected: i64) -> Vec<i64> {
    let mut lags = STANDARD_LAGS.to_vec();
    if !lags.contains(&selected) {
        lags.push(selected);
    }
    lags
}

pub fn correlation_table(rows: &[MergedRow], selected: i64) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row!["Lag", "r", "Samples", "Interpretation", "-1 ... 0 ... +1"]);

    for lag in lags_for(selected) {
        let marker = if lag == selected { "*" } else { "" };
        match correlate(rows, lag) {
            Ok(result) => {
                table.add_row(row![
                    format!("{lag}d{marker}"),
                    format!("{:+.4}", result.coefficient),
                    result.sample_size,
                    interpret(result.coefficient),
                    gauge(result.coefficient, GAUGE_HALF_WIDTH)
                ]);
            }
            Err(err) => {
                table.add_row(row![format!("{lag}d{marker}"), "n/a", samples_of(&err), err, ""]);
            }
        }
    }

    table
}

pub fn summary_table(summary: &SeriesSummary) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(row!["", "TVL (USD)", "Price (USD)"]);
    table.add_row(row!["Last", money(summary.tvl.last), money(summary.price.last)]);
    table.add_row(row!["Mean", money(summary.tvl.mean), money(summary.price.mean)]);
    table.add_row(row!["Min", money(summary.tvl.min), money(summary.price.min)]);
    table.add_row(row!["Max", money(summary.tvl.max), money(summary.price.max)]);
    table
}

/// Everything the dashboard shows for one lag and range selection.
pub fn report(rows: &[MergedRow], timeframe: Timeframe, lag_days: i64) -> String {
    let window = timeframe.slice(rows);
    let summary = match SeriesSummary::compute(window) {
        Ok(summary) => summary,
        Err(err) => return format!("Range {timeframe}: {err}\n"),
    };

    let mut out = format!(
        "Range {timeframe}: {} .. {} ({} days)\n",
        summary.first_date, summary.last_date, summary.rows
    );
    out.push_str(&headline(window, lag_days));
    out.push('\n');
    out.push_str(&correlation_table(window, lag_days).to_string());
    out.push('\n');
    out.push_str(&summary_table(&summary).to_string());
    out
}

/// One line for the selected lag; analysis errors are shown, not raised.
pub fn headline(rows: &[MergedRow], lag_days: i64) -> String {
    match correlate(rows, lag_days) {
        Ok(result) => format!(
            "{}\n{}",
            describe(&result),
            gauge(result.coefficient, GAUGE_HALF_WIDTH)
        ),
        Err(err) => format!("lag {lag_days}d: {err}"),
    }
}

fn samples_of(err: &AnalysisError) -> String {
    match err {
        AnalysisError::InsufficientData { samples, .. }
        | AnalysisError::ConstantSeries { samples, .. } => samples.to_string(),
        _ => "-".to_string(),
    }
}

fn money(value: f64) -> String {
    if value.abs() >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if value.abs() >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Days, NaiveDate};

    fn linear(days: u64) -> Vec<MergedRow> {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..days)
            .map(|i| {
                let tvl = 1_000.0 + i as f64;
                MergedRow::new(first + Days::new(i), tvl, 2.0 * tvl + 3.0)
            })
            .collect()
    }

    #[test]
    fn selected_lag_is_added_once() {
        assert_eq!(lags_for(7), vec![0, 1, 7, 30]);
        assert_eq!(lags_for(14), vec![0, 1, 7, 30, 14]);
        assert_eq!(lags_for(-3), vec![0, 1, 7, 30, -3]);
    }

    #[test]
    fn report_lists_every_lag() {
        let text = report(&linear(60), Timeframe::All, 0);

        assert!(text.starts_with("Range all: 2024-01-01 .. 2024-02-29 (60 days)"));
        assert!(text.contains("lag   0d  r = +1.0000  (n = 60)  Strong Positive Correlation."));
        for lag in ["0d*", "1d", "7d", "30d"] {
            assert!(text.contains(lag), "missing {lag}");
        }
    }

    #[test]
    fn short_range_reports_insufficient_data_inline() {
        let text = report(&linear(60), Timeframe::OneWeek, 30);

        assert!(text.contains("lag 30d: not enough data"));
        assert!(text.contains("n/a"));
    }

    #[test]
    fn large_values_are_abbreviated() {
        assert_eq!(money(12_345_678_901.0), "12.35B");
        assert_eq!(money(2_500_000.0), "2.50M");
        assert_eq!(money(95.126), "95.13");
    }
}
