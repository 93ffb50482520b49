//! Markdown document writer

use super::traits::{ArtifactWriter, PostArtifact};
use super::{ensure_dir, write_file};
use crate::types::ContentBundle;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

const LISTEN_HEADING: &str = "Spotifyで聴く";
const SOCIAL_HEADING: &str = "SNS投稿用";

/// Render the Markdown document for a bundle
///
/// Section order is fixed: title, body, listen section with the embed,
/// then the social post.
pub fn render_document(bundle: &ContentBundle, embed_widget: &str) -> String {
    format!(
        "# {title}\n\n{body}\n\n## {listen}\n\n{embed}\n\n---\n\n### {social}\n\n{post}\n",
        title = bundle.title,
        body = bundle.body,
        listen = LISTEN_HEADING,
        embed = embed_widget,
        social = SOCIAL_HEADING,
        post = bundle.social_post,
    )
}

/// Writes `{prefix}{id}.md` under the output directory
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    dir: PathBuf,
    file_prefix: String,
}

impl DocumentWriter {
    /// Create a writer for the given directory and file-name prefix
    pub fn new(dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of an artifact for a record with the given extension
    pub fn artifact_path(&self, record_id: &str, extension: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", self.file_prefix, record_id, extension))
    }
}

#[async_trait]
impl ArtifactWriter for DocumentWriter {
    async fn write(&self, post: &PostArtifact<'_>) -> crate::Result<Vec<PathBuf>> {
        ensure_dir(&self.dir).await?;

        let path = self.artifact_path(post.record_id, "md");
        let document = render_document(post.bundle, &post.track.embed_widget);
        write_file(&path, document.as_bytes()).await?;

        info!(record_id = %post.record_id, path = %path.display(), "document written");
        Ok(vec![path])
    }

    fn name(&self) -> &'static str {
        "document"
    }
}
