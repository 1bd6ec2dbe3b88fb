use thiserror::Error;

/// A payload or stored file did not have the shape we expect.
///
/// `origin` names the source (`defillama`, `gateio`, a file path) and
/// `expected` the structure we were looking for, so a layout change upstream
/// can be diagnosed from the log line alone.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{origin}: expected {expected} ({detail})")]
pub struct ParseError {
    pub origin: String,
    pub expected: String,
    pub detail: String,
}

impl ParseError {
    pub fn new(
        origin: impl Into<String>,
        expected: impl Into<String>,
        detail: impl ToString,
    ) -> Self {
        Self {
            origin: origin.into(),
            expected: expected.into(),
            detail: detail.to_string(),
        }
    }
}
