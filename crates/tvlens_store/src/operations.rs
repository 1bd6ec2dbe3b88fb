use crate::{HEADER, StoreError};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::info;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tvlens_shared_models::{MergedRow, ParseError};

/// The merged dataset on disk: `date,tvl_usd,price`, one row per day,
/// ascending by date.
pub struct MergedStore {
    path: PathBuf,
}

impl MergedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file atomically: rows go to a temporary file in the same
    /// directory which is renamed over the target once fully written. A
    /// failed run leaves the previous file untouched.
    pub fn save(&self, rows: &[MergedRow]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir).map_err(|e| self.io(e))?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(tmp);
        writer.write_record(HEADER).map_err(|e| self.csv(e))?;
        for row in rows {
            writer.serialize(row).map_err(|e| self.csv(e))?;
        }

        let mut tmp = writer.into_inner().map_err(|e| self.io(e.into_error()))?;
        tmp.flush().map_err(|e| self.io(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io(e))?;
        tmp.persist(&self.path).map_err(|e| self.io(e.error))?;

        info!("Saved {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }

    /// Reads the dataset back, rejecting anything the collector would not
    /// have written: a different header, malformed rows, or dates that are
    /// not strictly ascending.
    pub fn load(&self) -> Result<Vec<MergedRow>, StoreError> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                path: self.path.clone(),
            },
            _ => self.io(e),
        })?;

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        let header = reader
            .headers()
            .map_err(|e| {
                if e.is_io_error() {
                    self.csv(e)
                } else {
                    self.parse("a UTF-8 date,tvl_usd,price header", e).into()
                }
            })?
            .clone();
        if header != StringRecord::from(HEADER.to_vec()) {
            return Err(self
                .parse(
                    "header date,tvl_usd,price",
                    format!("found {}", header.iter().collect::<Vec<_>>().join(",")),
                )
                .into());
        }

        let mut rows: Vec<MergedRow> = Vec::new();
        for (i, record) in reader.deserialize::<MergedRow>().enumerate() {
            let line = i + 2;
            let row = record
                .map_err(|e| self.parse("a date,number,number row", format!("line {line}: {e}")))?;

            if !row.tvl_usd.is_finite() || !row.price.is_finite() {
                return Err(self
                    .parse("finite numbers", format!("line {line}: {row:?}"))
                    .into());
            }
            if let Some(prev) = rows.last() {
                if row.date <= prev.date {
                    return Err(self
                        .parse(
                            "strictly ascending dates",
                            format!("line {line}: {} follows {}", row.date, prev.date),
                        )
                        .into());
                }
            }
            rows.push(row);
        }

        Ok(rows)
    }

    fn parse(&self, expected: &str, detail: impl ToString) -> ParseError {
        ParseError::new(self.path.display().to_string(), expected, detail)
    }

    fn io(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn csv(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}
