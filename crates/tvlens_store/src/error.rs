use std::path::PathBuf;
use thiserror::Error;
use tvlens_shared_models::ParseError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no merged dataset at {}; run the collector first", .path.display())]
    NotFound { path: PathBuf },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
