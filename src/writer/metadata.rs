//! Document plus JSON metadata writer

use super::document::DocumentWriter;
use super::traits::{ArtifactWriter, PostArtifact};
use super::write_file;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Machine-readable sibling of a post document
///
/// Field names are what the site reads from `{id}.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetadata {
    /// Record id
    pub id: String,
    /// Article headline
    pub title: String,
    /// Song title
    pub song_name: String,
    /// Artist name
    pub artist_name: String,
    /// Track URL from the dataset
    pub spotify_url: String,
    /// Article body
    pub content: String,
    /// Embeddable player markup
    pub iframe_code: String,
    /// Social post
    pub sns_post: String,
    /// Local generation time, ISO-8601
    pub created_at: String,
}

impl PostMetadata {
    /// Assemble the metadata record for a post, stamped with the current local time
    pub fn from_post(post: &PostArtifact<'_>) -> Self {
        Self {
            id: post.record_id.to_string(),
            title: post.bundle.title.clone(),
            song_name: post.metadata.song_name.clone(),
            artist_name: post.metadata.artist_name.clone(),
            spotify_url: post.source_url.to_string(),
            content: post.bundle.body.clone(),
            iframe_code: post.track.embed_widget.clone(),
            sns_post: post.bundle.social_post.clone(),
            created_at: chrono::Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
        }
    }
}

/// Writes the Markdown document, then `{prefix}{id}.json` next to it
#[derive(Debug, Clone)]
pub struct DocumentWithMetadataWriter {
    document: DocumentWriter,
}

impl DocumentWithMetadataWriter {
    /// Wrap a document writer; metadata lands in the same directory
    pub fn new(document: DocumentWriter) -> Self {
        Self { document }
    }
}

#[async_trait]
impl ArtifactWriter for DocumentWithMetadataWriter {
    async fn write(&self, post: &PostArtifact<'_>) -> crate::Result<Vec<PathBuf>> {
        let mut paths = self.document.write(post).await?;

        let path = self.document.artifact_path(post.record_id, "json");
        let json = serde_json::to_string_pretty(&PostMetadata::from_post(post))?;
        write_file(&path, json.as_bytes()).await?;

        info!(record_id = %post.record_id, path = %path.display(), "metadata written");
        paths.push(path);
        Ok(paths)
    }

    fn name(&self) -> &'static str {
        "document+metadata"
    }
}
