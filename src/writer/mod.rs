//! Output artifact writing
//!
//! The [`ArtifactWriter`] trait is the seam between the pipeline and the
//! content store. Two strategies cover the two deployment layouts:
//!
//! - [`DocumentWriter`]: one Markdown document per record
//! - [`DocumentWithMetadataWriter`]: the document plus a JSON metadata sibling
//!
//! Both key their files by record id and overwrite earlier output for the
//! same id. I/O failures are returned, never swallowed. [`PostIndex`] reads
//! the metadata layout back for listing and display.
//!
//! ## Usage
//!
//! ```no_run
//! use autotune_reviewer::config::OutputConfig;
//! use autotune_reviewer::writer::writer_for;
//!
//! let writer = writer_for(&OutputConfig::default());
//! println!("writing with {}", writer.name());
//! ```

mod document;
mod index;
mod metadata;
mod traits;

pub use document::{DocumentWriter, render_document};
pub use index::{Post, PostIndex};
pub use metadata::{DocumentWithMetadataWriter, PostMetadata};
pub use traits::{ArtifactWriter, PostArtifact};

use crate::config::{OutputConfig, OutputLayout};
use crate::error::{ArtifactError, Result};
use std::path::Path;
use std::sync::Arc;

/// Build the writer selected by the output layout
pub fn writer_for(config: &OutputConfig) -> Arc<dyn ArtifactWriter> {
    let document = DocumentWriter::new(config.dir.clone(), config.file_prefix.clone());
    match config.layout {
        OutputLayout::Document => Arc::new(document),
        OutputLayout::DocumentWithMetadata => Arc::new(DocumentWithMetadataWriter::new(document)),
    }
}

/// Create the output directory (and parents) if missing
pub(crate) async fn ensure_dir(dir: &Path) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ArtifactError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    Ok(())
}

/// Write (or overwrite) a whole file
pub(crate) async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(())
}
