use crate::correlation::CorrelationResult;

pub fn strength(r: f64) -> &'static str {
    let magnitude = r.abs();

    if magnitude >= 0.7 {
        "Strong"
    } else if magnitude >= 0.4 {
        "Moderate"
    } else if magnitude >= 0.1 {
        "Weak"
    } else {
        "Very Weak / No clear"
    }
}

pub fn direction(r: f64) -> &'static str {
    if r > 0.1 {
        "Positive"
    } else if r < -0.1 {
        "Negative"
    } else {
        "Linear Relationship"
    }
}

/// Plain-language reading of a coefficient, e.g. `Strong Positive Correlation.`
pub fn interpret(r: f64) -> String {
    if r.abs() < 0.1 {
        format!("{} {}.", strength(r), direction(r))
    } else {
        format!("{} {} Correlation.", strength(r), direction(r))
    }
}

/// Bidirectional text bar centred on zero: positive values fill to the right
/// of `|`, negative ones to the left, `half_width` cells per side.
pub fn gauge(r: f64, half_width: usize) -> String {
    let filled = ((r.abs().min(1.0) * half_width as f64).round() as usize).min(half_width);
    let empty = half_width - filled;
    let track = "-".repeat(half_width);

    if r >= 0.0 {
        format!("[{track}|{}{}]", "#".repeat(filled), "-".repeat(empty))
    } else {
        format!("[{}{}|{track}]", "-".repeat(empty), "#".repeat(filled))
    }
}

pub fn describe(result: &CorrelationResult) -> String {
    format!(
        "lag {:>3}d  r = {:+.4}  (n = {})  {}",
        result.lag_days,
        result.coefficient,
        result.sample_size,
        interpret(result.coefficient)
    )
}
