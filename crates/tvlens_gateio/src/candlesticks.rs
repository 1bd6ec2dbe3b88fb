use crate::method::Method;
use bon::Builder;
use serde::de::{self, IgnoredAny, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tvlens_shared_models::LooseNumber;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interval {
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "7d")]
    Week,
}

impl Interval {
    pub fn seconds(&self) -> i64 {
        match self {
            Interval::Hour => 3_600,
            Interval::FourHours => 14_400,
            Interval::Day => 86_400,
            Interval::Week => 604_800,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Builder)]
#[builder(on(String, into))]
pub struct CandlesticksParams {
    pub currency_pair: String,
    #[builder(default)]
    pub interval: Interval,
    #[serde(rename = "from")]
    pub from_ts: i64,
    #[serde(rename = "to")]
    pub to_ts: i64,
}

/// One row of `GET /spot/candlesticks`.
///
/// Gate answers with positional string arrays:
/// `[t, quote_volume, close, high, low, open, base_volume?, window_closed?]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GateCandle {
    pub timestamp: i64,
    pub quote_volume: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub base_volume: Option<f64>,
}

impl<'de> Deserialize<'de> for GateCandle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(GateCandleVisitor)
    }
}

struct GateCandleVisitor;

impl<'de> Visitor<'de> for GateCandleVisitor {
    type Value = GateCandle;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a candlestick array [t, quote_volume, close, high, low, open, ...]")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<GateCandle, A::Error> {
        const FIELDS: [&str; 6] = ["timestamp", "quote_volume", "close", "high", "low", "open"];

        let mut values = [0f64; 5];
        let timestamp = next_number(&mut seq, 0, FIELDS[0])?
            .as_i64()
            .ok_or_else(|| de::Error::custom("candle timestamp is not an integer"))?;

        for (i, name) in FIELDS.iter().enumerate().skip(1) {
            values[i - 1] = next_number(&mut seq, i, name)?
                .as_f64()
                .ok_or_else(|| de::Error::custom(format!("candle {name} is not a number")))?;
        }

        let base_volume = match seq.next_element::<serde_json::Value>()? {
            Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(serde_json::Value::Number(n)) => n.as_f64(),
            _ => None,
        };
        while seq.next_element::<IgnoredAny>()?.is_some() {}

        let [quote_volume, close, high, low, open] = values;
        Ok(GateCandle {
            timestamp,
            quote_volume,
            close,
            high,
            low,
            open,
            base_volume,
        })
    }
}

fn next_number<'de, A: SeqAccess<'de>>(
    seq: &mut A,
    index: usize,
    name: &str,
) -> Result<LooseNumber, A::Error> {
    seq.next_element::<LooseNumber>()?
        .ok_or_else(|| de::Error::invalid_length(index, &format!("candle field {name}").as_str()))
}

pub struct Candlesticks;

impl Method for Candlesticks {
    const PATH: &'static str = "/spot/candlesticks";

    type Response = Vec<GateCandle>;
    type Params = CandlesticksParams;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_string_rows_with_optional_tail() {
        let rows: Vec<GateCandle> = serde_json::from_str(
            r#"[
                ["1704153600","1050.5","10.5","11","9.8","10.1","100.2","true"],
                ["1704240000","990","9.9","10.6","9.5","10.5"]
            ]"#,
        )
        .unwrap();

        assert_eq!(rows[0].timestamp, 1_704_153_600);
        assert_eq!(rows[0].close, 10.5);
        assert_eq!(rows[0].open, 10.1);
        assert_eq!(rows[0].base_volume, Some(100.2));
        assert_eq!(rows[1].high, 10.6);
        assert_eq!(rows[1].low, 9.5);
        assert_eq!(rows[1].base_volume, None);
    }

    #[test]
    fn short_rows_are_rejected() {
        let result: Result<Vec<GateCandle>, _> =
            serde_json::from_str(r#"[["1704153600","1050.5","10.5"]]"#);
        assert!(result.is_err());
    }

    #[test]
    fn params_serialize_with_gate_names() {
        let params = CandlesticksParams::builder()
            .currency_pair("AAVE_USDT")
            .from_ts(1)
            .to_ts(2)
            .build();

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"currency_pair": "AAVE_USDT", "interval": "1d", "from": 1, "to": 2})
        );
    }
}
