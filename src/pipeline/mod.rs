//! Per-record processing pipeline
//!
//! For every pending record, in dataset order and one at a time:
//! 1. Extract - track reference and display metadata (skip if no track id)
//! 2. Generate - content bundle (service or template, never fails)
//! 3. Write - output artifacts (I/O failure aborts the run)
//!
//! Successful ids are collected and committed to the dataset in a single
//! rewrite after every pending record has been attempted. A run that aborts
//! never reaches the commit, so the dataset is left untouched.

use crate::config::Config;
use crate::error::{ExtractError, Result};
use crate::extractor::MetadataExtractor;
use crate::generator::ContentGenerator;
use crate::store::RecordStore;
use crate::types::{Event, ProcessedSet, SourceRecord};
use crate::writer::{ArtifactWriter, PostArtifact, writer_for};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Terminal state of one record within a run
#[derive(Debug)]
pub enum RecordOutcome {
    /// All stages completed; the id joins the processed set
    Processed {
        /// Artifacts written
        paths: Vec<PathBuf>,
    },
    /// Left pending for a later run
    Skipped(ExtractError),
}

/// A record that was left pending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Record id
    pub id: String,
    /// Why it was skipped
    pub reason: String,
}

/// What a run did
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Rows in the dataset
    pub total: usize,
    /// Rows that were pending at start
    pub pending: usize,
    /// Ids that completed every stage
    pub processed: ProcessedSet,
    /// Records left pending
    pub skipped: Vec<SkippedRecord>,
    /// Whether the dataset was rewritten
    pub committed: bool,
}

/// Composes the record store, extractor, generator, and artifact writer
pub struct Pipeline {
    store: RecordStore,
    extractor: MetadataExtractor,
    generator: ContentGenerator,
    writer: Arc<dyn ArtifactWriter>,
    /// Event channel for progress reporting
    event_tx: broadcast::Sender<Event>,
}

impl Pipeline {
    /// Build every component from configuration
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or an HTTP client cannot be created
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let writer = writer_for(&config.output);
        Ok(Self::from_parts(
            RecordStore::new(config.dataset),
            MetadataExtractor::new(config.extractor)?,
            ContentGenerator::new(config.generator)?,
            writer,
        ))
    }

    /// Assemble a pipeline from already-built components
    pub fn from_parts(
        store: RecordStore,
        extractor: MetadataExtractor,
        generator: ContentGenerator,
        writer: Arc<dyn ArtifactWriter>,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(1000);
        Self {
            store,
            extractor,
            generator,
            writer,
            event_tx,
        }
    }

    /// Subscribe to progress events
    ///
    /// Events sent while nobody is subscribed are dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Process every pending record, then commit the successes
    ///
    /// # Errors
    ///
    /// Dataset read/rewrite failures and artifact write failures end the run
    /// immediately. Nothing is committed in that case.
    pub async fn run(&self) -> Result<RunSummary> {
        let (mut dataset, pending) = self.store.load_pending().await?;

        let mut summary = RunSummary {
            total: dataset.len(),
            pending: pending.len(),
            ..Default::default()
        };
        self.emit(Event::RunStarted {
            total: summary.total,
            pending: summary.pending,
        });

        if pending.is_empty() {
            info!("no pending records");
            self.emit(Event::RunFinished {
                processed: 0,
                skipped: 0,
            });
            return Ok(summary);
        }

        info!(pending = pending.len(), writer = self.writer.name(), "processing records");

        for record in &pending {
            match self.process_record(record).await? {
                RecordOutcome::Processed { .. } => {
                    summary.processed.insert(record.id.clone());
                }
                RecordOutcome::Skipped(reason) => {
                    summary.skipped.push(SkippedRecord {
                        id: record.id.clone(),
                        reason: reason.to_string(),
                    });
                }
            }
        }

        if !summary.processed.is_empty() {
            let updated = self.store.commit(&mut dataset, &summary.processed).await?;
            summary.committed = true;
            self.emit(Event::DatasetCommitted { updated });
        }

        info!(
            processed = summary.processed.len(),
            skipped = summary.skipped.len(),
            "run finished"
        );
        self.emit(Event::RunFinished {
            processed: summary.processed.len(),
            skipped: summary.skipped.len(),
        });
        Ok(summary)
    }

    /// Take one record through extract, generate, and write
    ///
    /// # Errors
    ///
    /// Only artifact write failures are returned; a missing track id is a
    /// [`RecordOutcome::Skipped`].
    pub async fn process_record(&self, record: &SourceRecord) -> Result<RecordOutcome> {
        info!(record_id = %record.id, url = %record.track_url, "processing record");
        self.emit(Event::RecordStarted {
            id: record.id.clone(),
            url: record.track_url.clone(),
        });

        let extraction = match self.extractor.extract(&record.track_url).await {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!(record_id = %record.id, error = %e, "skipping record");
                self.emit(Event::RecordSkipped {
                    id: record.id.clone(),
                    reason: e.to_string(),
                });
                return Ok(RecordOutcome::Skipped(e));
            }
        };
        self.emit(Event::MetadataExtracted {
            id: record.id.clone(),
            song_name: extraction.metadata.song_name.clone(),
            artist_name: extraction.metadata.artist_name.clone(),
            degraded: extraction.metadata.is_degraded(),
        });

        let generated = self.generator.generate(&extraction.metadata).await;
        self.emit(Event::ContentGenerated {
            id: record.id.clone(),
            fallback: generated.is_fallback(),
        });

        let post = PostArtifact {
            record_id: &record.id,
            bundle: &generated.bundle,
            track: &extraction.track,
            metadata: &extraction.metadata,
            source_url: &record.track_url,
        };
        let paths = self.writer.write(&post).await?;

        info!(record_id = %record.id, files = paths.len(), "record processed");
        self.emit(Event::ArtifactsWritten {
            id: record.id.clone(),
            paths: paths.clone(),
        });
        Ok(RecordOutcome::Processed { paths })
    }

    fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
