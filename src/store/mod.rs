//! CSV-backed record store
//!
//! Loads the source dataset, selects rows whose status is `NEW`, and after a
//! run rewrites the whole file with processed rows switched to `DONE`. Every
//! other cell (and every unprocessed row) is written back exactly as read.

use crate::config::DatasetConfig;
use crate::error::{DatasetError, Error, Result};
use crate::types::{ProcessedSet, RecordStatus, STATUS_DONE, SourceRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Positions of the columns the pipeline reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    id: usize,
    url: usize,
    status: usize,
}

/// The full dataset as loaded, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<SourceRecord>,
    columns: Option<Columns>,
}

impl Dataset {
    /// Header row
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All records, pending or not
    pub fn records(&self) -> &[SourceRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the dataset has no rows
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with status `NEW`
    pub fn pending(&self) -> impl Iterator<Item = &SourceRecord> {
        self.records.iter().filter(|r| r.status.is_pending())
    }

    /// Cell of a record by column label
    pub fn field<'a>(&self, record: &'a SourceRecord, column: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h == column)?;
        record.fields.get(index).map(String::as_str)
    }

    /// Switch every record whose id is in `processed` to `DONE`
    ///
    /// Returns the number of rows changed.
    fn mark_done(&mut self, processed: &ProcessedSet) -> usize {
        let Some(columns) = self.columns else {
            return 0;
        };

        let mut updated = 0;
        for record in &mut self.records {
            if processed.contains(&record.id) {
                record.status = RecordStatus::Done;
                record.fields[columns.status] = STATUS_DONE.to_string();
                updated += 1;
            }
        }
        updated
    }
}

/// Reads and rewrites the source dataset
#[derive(Debug, Clone)]
pub struct RecordStore {
    config: DatasetConfig,
}

impl RecordStore {
    /// Create a store for the configured dataset
    pub fn new(config: DatasetConfig) -> Self {
        Self { config }
    }

    /// Dataset file location
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Load the dataset and the records awaiting processing
    ///
    /// A missing file is not an error: both collections come back empty.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file cannot be parsed, lacks one of the
    /// configured columns, or has a row longer than its header.
    pub async fn load_pending(&self) -> Result<(Dataset, Vec<SourceRecord>)> {
        let path = self.path();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "dataset not found, nothing to do");
                return Ok((Dataset::default(), Vec::new()));
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let dataset = self.parse(&bytes)?;
        let pending: Vec<SourceRecord> = dataset.pending().cloned().collect();

        info!(
            path = %path.display(),
            total = dataset.len(),
            pending = pending.len(),
            "dataset loaded"
        );
        Ok((dataset, pending))
    }

    /// Mark processed records `DONE` and rewrite the whole dataset
    ///
    /// The file is written to a sibling temporary file and renamed into place.
    /// Returns the number of rows switched to `DONE`.
    pub async fn commit(&self, dataset: &mut Dataset, processed: &ProcessedSet) -> Result<usize> {
        if dataset.headers.is_empty() {
            debug!("empty dataset, nothing to commit");
            return Ok(0);
        }

        let updated = dataset.mark_done(processed);
        let bytes = self.serialize(dataset)?;

        let path = self.path();
        let temp_path = temp_path_for(path);
        tokio::fs::write(&temp_path, &bytes).await?;
        tokio::fs::rename(&temp_path, path).await?;

        info!(path = %path.display(), updated, "dataset updated");
        Ok(updated)
    }

    fn parse(&self, bytes: &[u8]) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| self.malformed(e))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() {
            return Ok(Dataset::default());
        }

        let columns = Columns {
            id: self.column(&headers, &self.config.id_column)?,
            url: self.column(&headers, &self.config.url_column)?,
            status: self.column(&headers, &self.config.status_column)?,
        };

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| self.malformed(e))?;
            if row.len() > headers.len() {
                return Err(DatasetError::RowTooLong {
                    line: row.position().map(|p| p.line()).unwrap_or_default(),
                    expected: headers.len(),
                    found: row.len(),
                }
                .into());
            }

            let mut fields: Vec<String> = row.iter().map(str::to_string).collect();
            fields.resize(headers.len(), String::new());

            records.push(SourceRecord {
                id: fields[columns.id].clone(),
                track_url: fields[columns.url].clone(),
                status: RecordStatus::parse(&fields[columns.status]),
                fields,
            });
        }

        Ok(Dataset {
            headers,
            records,
            columns: Some(columns),
        })
    }

    fn serialize(&self, dataset: &Dataset) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&dataset.headers)
            .map_err(|e| self.malformed(e))?;
        for record in &dataset.records {
            writer
                .write_record(&record.fields)
                .map_err(|e| self.malformed(e))?;
        }
        writer.into_inner().map_err(|e| Error::Io(e.into_error()))
    }

    fn column(&self, headers: &[String], label: &str) -> Result<usize> {
        headers.iter().position(|h| h == label).ok_or_else(|| {
            DatasetError::MissingColumn {
                column: label.to_string(),
                path: self.config.path.clone(),
            }
            .into()
        })
    }

    fn malformed(&self, e: csv::Error) -> Error {
        DatasetError::Malformed {
            path: self.config.path.clone(),
            reason: e.to_string(),
        }
        .into()
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
