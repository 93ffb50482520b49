//! Read-back of the content store
//!
//! The site lists every post that has a JSON metadata file, shows the newest
//! first, and renders a single post from its metadata plus Markdown document.

use super::metadata::PostMetadata;
use crate::config::OutputConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

const METADATA_EXTENSION: &str = "json";
const DOCUMENT_EXTENSION: &str = "md";

/// A published post: metadata together with its Markdown document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Record id (file stem without prefix)
    pub id: String,
    /// Contents of `{prefix}{id}.json`
    pub metadata: PostMetadata,
    /// Contents of `{prefix}{id}.md`
    pub document: String,
}

/// Lists and loads posts written by
/// [`DocumentWithMetadataWriter`](super::DocumentWithMetadataWriter)
#[derive(Debug, Clone)]
pub struct PostIndex {
    dir: PathBuf,
    file_prefix: String,
}

impl PostIndex {
    /// Create an index over a directory; file names carry `file_prefix`
    pub fn new(dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    /// Index over the configured output location
    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.dir.clone(), config.file_prefix.clone())
    }

    /// Directory being read
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids of every post with a metadata file, in file-name order
    ///
    /// A missing directory yields an empty list.
    ///
    /// # Errors
    /// Returns error if the directory exists but cannot be listed
    pub async fn ids(&self) -> Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "post directory not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(METADATA_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && let Some(id) = stem.strip_prefix(self.file_prefix.as_str())
            {
                ids.push(id.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Load one post; `None` when its metadata or document is missing
    ///
    /// # Errors
    /// Returns error if a file cannot be read or the metadata is not valid JSON
    pub async fn get(&self, id: &str) -> Result<Option<Post>> {
        let Some(raw) = read_optional(&self.path_for(id, METADATA_EXTENSION)).await? else {
            return Ok(None);
        };
        let Some(document) = read_optional(&self.path_for(id, DOCUMENT_EXTENSION)).await? else {
            return Ok(None);
        };

        Ok(Some(Post {
            id: id.to_string(),
            metadata: serde_json::from_str(&raw)?,
            document,
        }))
    }

    /// Metadata of every post, newest `created_at` first
    ///
    /// # Errors
    /// Returns error if a metadata file cannot be read or parsed
    pub async fn sorted(&self) -> Result<Vec<PostMetadata>> {
        let mut posts = Vec::new();
        for id in self.ids().await? {
            let raw = tokio::fs::read_to_string(self.path_for(&id, METADATA_EXTENSION)).await?;
            posts.push(serde_json::from_str::<PostMetadata>(&raw)?);
        }
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    fn path_for(&self, id: &str, extension: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", self.file_prefix, id, extension))
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
