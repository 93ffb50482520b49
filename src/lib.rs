//! # autotune-reviewer
//!
//! Batch pipeline that turns a CSV of music-track links into published posts.
//!
//! ## Design Philosophy
//!
//! autotune-reviewer is designed to be:
//! - **Sequential** - One record at a time, in dataset order
//! - **Degrading, not failing** - Page fetch and generation problems fall back to placeholders
//! - **All-or-nothing commit** - The dataset is rewritten once, only after every record was attempted
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use autotune_reviewer::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::site().with_env();
//!     let pipeline = Pipeline::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = pipeline.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = pipeline.run().await?;
//!     println!("processed {} records", summary.processed.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Track id and display metadata extraction
pub mod extractor;
/// Post content generation
pub mod generator;
/// Per-record orchestration
pub mod pipeline;
/// CSV dataset access
pub mod store;
/// Core types and events
pub mod types;
/// Output artifact writers
pub mod writer;

// Re-export commonly used types
pub use config::{
    Config, DatasetConfig, ExtractorConfig, GeneratorConfig, OutputConfig, OutputLayout,
};
pub use error::{ArtifactError, DatasetError, Error, ExtractError, GenerationError, Result};
pub use extractor::{Extraction, MetadataExtractor};
pub use generator::{ContentGenerator, ContentSource, Generated};
pub use pipeline::{Pipeline, RecordOutcome, RunSummary, SkippedRecord};
pub use store::{Dataset, RecordStore};
pub use types::{
    ContentBundle, DisplayMetadata, Event, MetadataSource, ProcessedSet, RecordStatus,
    SourceRecord, TrackReference,
};
pub use writer::{
    ArtifactWriter, DocumentWithMetadataWriter, DocumentWriter, Post, PostArtifact, PostIndex,
    PostMetadata,
};
