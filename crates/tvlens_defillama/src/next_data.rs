use chrono::{DateTime, NaiveDate};
use log::warn;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::collections::BTreeMap;
use tvlens_shared_models::{LooseNumber, ParseError, TvlPoint};

const ORIGIN: &str = "defillama";

#[derive(Deserialize, Debug)]
pub struct NextData {
    pub props: Props,
}

#[derive(Deserialize, Debug)]
pub struct Props {
    #[serde(rename = "pageProps")]
    pub page_props: PageProps,
}

#[derive(Deserialize, Debug)]
pub struct PageProps {
    #[serde(rename = "tvlChartData")]
    pub tvl_chart_data: Vec<TvlChartEntry>,
}

/// `[unix_seconds, tvl_usd]`; the timestamp usually arrives as a string.
#[derive(Deserialize, Debug)]
pub struct TvlChartEntry(pub LooseNumber, pub LooseNumber);

/// Text of the single `<script id="__NEXT_DATA__">` tag.
pub fn extract_next_data(html: &str) -> Result<String, ParseError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("script#__NEXT_DATA__")
        .map_err(|e| ParseError::new(ORIGIN, "a valid selector", e))?;

    let mut scripts = document.select(&selector);
    let script = scripts
        .next()
        .ok_or_else(|| ParseError::new(ORIGIN, "a __NEXT_DATA__ script tag", "none found"))?;
    if scripts.next().is_some() {
        return Err(ParseError::new(
            ORIGIN,
            "exactly one __NEXT_DATA__ script tag",
            "found several",
        ));
    }

    let text: String = script.text().collect();
    if text.trim().is_empty() {
        return Err(ParseError::new(
            ORIGIN,
            "a non-empty __NEXT_DATA__ payload",
            "script tag is empty",
        ));
    }

    Ok(text)
}

pub fn parse_tvl_page(html: &str) -> Result<Vec<TvlPoint>, ParseError> {
    let payload = extract_next_data(html)?;
    let data: NextData = serde_json::from_str(&payload)
        .map_err(|e| ParseError::new(ORIGIN, "props.pageProps.tvlChartData", e))?;

    tvl_points(&data.props.page_props.tvl_chart_data)
}

/// Normalises raw chart entries into one point per day. Unparseable or
/// negative entries are skipped; within a day the latest timestamp wins.
pub fn tvl_points(entries: &[TvlChartEntry]) -> Result<Vec<TvlPoint>, ParseError> {
    let mut stamped: Vec<(i64, f64)> = entries
        .iter()
        .filter_map(|TvlChartEntry(ts, value)| match (ts.as_i64(), value.as_f64()) {
            (Some(ts), Some(value)) if value >= 0.0 => Some((ts, value)),
            _ => {
                warn!("Skipping malformed TVL entry [{ts:?}, {value:?}]");
                None
            }
        })
        .collect();
    stamped.sort_by_key(|(ts, _)| *ts);

    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (ts, value) in stamped {
        match DateTime::from_timestamp(ts, 0) {
            Some(at) => {
                by_day.insert(at.date_naive(), value);
            }
            None => warn!("Skipping TVL entry with out-of-range timestamp {ts}"),
        }
    }

    if by_day.is_empty() {
        return Err(ParseError::new(
            ORIGIN,
            "at least one [timestamp, tvl] pair in tvlChartData",
            format!("{} entries, none usable", entries.len()),
        ));
    }

    Ok(by_day
        .into_iter()
        .map(|(date, tvl_usd)| TvlPoint::new(date, tvl_usd))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(payload: &str) -> String {
        format!(
            r#"<!DOCTYPE html><html><head><title>Aave</title></head><body>
<div id="__next"></div>
<script id="__NEXT_DATA__" type="application/json">{payload}</script>
</body></html>"#
        )
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_string_and_numeric_timestamps() {
        let html = page(
            r#"{"props":{"pageProps":{"tvlChartData":[["1609545600",120.5],[1609459200,"100"]]}}}"#,
        );

        let points = parse_tvl_page(&html).unwrap();

        assert_eq!(
            points,
            vec![
                TvlPoint::new(day(2021, 1, 1), 100.0),
                TvlPoint::new(day(2021, 1, 2), 120.5),
            ]
        );
    }

    #[test]
    fn later_sample_on_the_same_day_wins() {
        let html = page(
            r#"{"props":{"pageProps":{"tvlChartData":[["1609531200",105],["1609459200",100]]}}}"#,
        );

        let points = parse_tvl_page(&html).unwrap();

        assert_eq!(points, vec![TvlPoint::new(day(2021, 1, 1), 105.0)]);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let html = page(
            r#"{"props":{"pageProps":{"tvlChartData":[["soon",1],["1609459200","n/a"],["1609545600",-5],["1609632000",7]]}}}"#,
        );

        let points = parse_tvl_page(&html).unwrap();

        assert_eq!(points, vec![TvlPoint::new(day(2021, 1, 3), 7.0)]);
    }

    #[test]
    fn missing_script_tag_is_a_parse_error() {
        let err = parse_tvl_page("<html><body>maintenance</body></html>").unwrap_err();
        assert!(err.expected.contains("__NEXT_DATA__"));
    }

    #[test]
    fn duplicated_script_tag_is_a_parse_error() {
        let payload = r#"{"props":{"pageProps":{"tvlChartData":[]}}}"#;
        let html = format!("{}{}", page(payload), page(payload));

        assert!(extract_next_data(&html).is_err());
    }

    #[test]
    fn missing_chart_key_is_a_parse_error() {
        let html = page(r#"{"props":{"pageProps":{"name":"Aave"}}}"#);

        let err = parse_tvl_page(&html).unwrap_err();
        assert_eq!(err.origin, "defillama");
        assert!(err.expected.contains("tvlChartData"));
    }

    #[test]
    fn empty_chart_is_a_parse_error() {
        let html = page(r#"{"props":{"pageProps":{"tvlChartData":[]}}}"#);
        assert!(parse_tvl_page(&html).is_err());
    }
}
