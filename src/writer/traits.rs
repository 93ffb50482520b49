//! Traits and types for artifact writing

use crate::types::{ContentBundle, DisplayMetadata, TrackReference};
use async_trait::async_trait;
use std::path::PathBuf;

/// Everything a writer may need to persist one record
#[derive(Debug, Clone, Copy)]
pub struct PostArtifact<'a> {
    /// Record id; used as the file stem
    pub record_id: &'a str,
    /// Generated text
    pub bundle: &'a ContentBundle,
    /// Track id and embed markup
    pub track: &'a TrackReference,
    /// Display metadata the bundle was generated from
    pub metadata: &'a DisplayMetadata,
    /// Track URL from the dataset
    pub source_url: &'a str,
}

/// Strategy for persisting a record's artifacts
///
/// Implementations create their destination directory as needed and
/// overwrite any earlier output for the same record id.
#[async_trait]
pub trait ArtifactWriter: Send + Sync {
    /// Persist the artifacts for one record
    ///
    /// # Returns
    ///
    /// The paths written, document first.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`](crate::error::ArtifactError) when the
    /// directory cannot be created or a file cannot be written. The pipeline
    /// treats this as fatal for the run.
    async fn write(&self, post: &PostArtifact<'_>) -> crate::Result<Vec<PathBuf>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
