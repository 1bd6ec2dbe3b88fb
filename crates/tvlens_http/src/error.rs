use thiserror::Error;
use tvlens_shared_models::ParseError;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("anti-bot challenge at {url} not cleared after {attempts} attempts")]
    Challenge { url: String, attempts: u32 },
    #[error("{label}: giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        label: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether trying the same request again could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            FetchError::Timeout { .. }
            | FetchError::Transport { .. }
            | FetchError::Body { .. }
            | FetchError::Challenge { .. } => true,
            FetchError::Build(_)
            | FetchError::InvalidUrl { .. }
            | FetchError::RetriesExhausted { .. } => false,
        }
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        let url = url.to_string();

        if err.is_timeout() {
            FetchError::Timeout { url }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url,
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport { url, source: err }
        }
    }
}

/// Failure of a whole source call: either the network gave up or the answer
/// did not match the expected schema.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
