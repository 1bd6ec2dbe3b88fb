use serde::Deserialize;

/// A JSON scalar that upstream APIs send either as a number or as a numeric
/// string (`1588636800` and `"1588636800"` both show up in the wild).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseNumber {
    /// Finite value, if the scalar is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            LooseNumber::Int(v) => *v as f64,
            LooseNumber::Float(v) => *v,
            LooseNumber::Text(s) => s.trim().parse::<f64>().ok()?,
        };

        value.is_finite().then_some(value)
    }

    /// Whole-number value, if the scalar is integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LooseNumber::Int(v) => Some(*v),
            LooseNumber::Float(v) => whole(*v),
            LooseNumber::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole))
            }
        }
    }
}

fn whole(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}
