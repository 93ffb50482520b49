//! Core types for autotune-reviewer

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Literal written to the status column for records awaiting processing
pub const STATUS_NEW: &str = "NEW";

/// Literal written to the status column once a record has been published
pub const STATUS_DONE: &str = "DONE";

/// Processing status of a dataset row
///
/// Only the dataset boundary deals in the literal strings; everything else
/// matches on this enum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordStatus {
    /// Waiting to be processed
    New,
    /// Already processed
    Done,
    /// Any other value; passed through untouched
    Other(String),
}

impl RecordStatus {
    /// Parse a status cell. Surrounding whitespace is ignored, case is not.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            STATUS_NEW => RecordStatus::New,
            STATUS_DONE => RecordStatus::Done,
            _ => RecordStatus::Other(raw.to_string()),
        }
    }

    /// The literal written back to the dataset
    pub fn as_str(&self) -> &str {
        match self {
            RecordStatus::New => STATUS_NEW,
            RecordStatus::Done => STATUS_DONE,
            RecordStatus::Other(raw) => raw,
        }
    }

    /// Whether the record should be picked up by a run
    pub fn is_pending(&self) -> bool {
        matches!(self, RecordStatus::New)
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the source dataset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceRecord {
    /// Unique record id
    pub id: String,
    /// Track page URL
    pub track_url: String,
    /// Parsed status
    pub status: RecordStatus,
    /// Every cell of the row, in header order, exactly as read
    pub fields: Vec<String>,
}

/// Track identifier and the embed markup derived from it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackReference {
    /// Provider track id (alphanumeric)
    pub track_id: String,
    /// Embeddable player markup referencing `track_id`
    pub embed_widget: String,
}

/// Where display metadata came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataSource {
    /// Read from the track page
    Page,
    /// Page could not be fetched; placeholders substituted
    Fallback,
}

/// Display metadata for a track (best effort)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayMetadata {
    /// Song title
    pub song_name: String,
    /// Artist name
    pub artist_name: String,
    /// Whether the values were read or substituted
    pub source: MetadataSource,
}

impl DisplayMetadata {
    /// True when placeholders were substituted for a failed fetch
    pub fn is_degraded(&self) -> bool {
        self.source == MetadataSource::Fallback
    }
}

/// Generated post text
///
/// Field names on the wire match the JSON object requested from the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBundle {
    /// Article headline
    pub title: String,
    /// Long-form article body
    #[serde(rename = "blog_content")]
    pub body: String,
    /// Short social post with hashtags
    #[serde(rename = "sns_post")]
    pub social_post: String,
}

/// Record ids that completed every stage in the current run
///
/// Keeps first-insertion order; inserting an id twice is a no-op.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessedSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl ProcessedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id; returns false if it was already present
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.order.push(id);
        true
    }

    /// Membership test
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    /// Number of ids
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when no record completed
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ProcessedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ProcessedSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Event emitted while a run progresses
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Dataset loaded
    RunStarted {
        /// Rows in the dataset
        total: usize,
        /// Rows with status NEW
        pending: usize,
    },

    /// A record entered the pipeline
    RecordStarted {
        /// Record id
        id: String,
        /// Track URL
        url: String,
    },

    /// Track id and display metadata resolved
    MetadataExtracted {
        /// Record id
        id: String,
        /// Song title (possibly a placeholder)
        song_name: String,
        /// Artist name (possibly a placeholder)
        artist_name: String,
        /// Placeholders were substituted for a failed page fetch
        degraded: bool,
    },

    /// Content bundle ready
    ContentGenerated {
        /// Record id
        id: String,
        /// Template fallback was used
        fallback: bool,
    },

    /// Artifacts written for a record
    ArtifactsWritten {
        /// Record id
        id: String,
        /// Files written
        paths: Vec<PathBuf>,
    },

    /// Record left pending
    RecordSkipped {
        /// Record id
        id: String,
        /// Why it was skipped
        reason: String,
    },

    /// Status column rewritten
    DatasetCommitted {
        /// Rows switched to DONE
        updated: usize,
    },

    /// All pending records attempted
    RunFinished {
        /// Records processed
        processed: usize,
        /// Records skipped
        skipped: usize,
    },
}
