use super::*;
use crate::config::{DatasetConfig, ExtractorConfig, GeneratorConfig};
use crate::error::{ArtifactError, Error};
use crate::writer::DocumentWriter;
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

const HEADER: &str = "ID,Spotify_URL,処理フラグ";

/// Writes documents normally until the call numbered `fail_on` (1-based)
struct FailingWriter {
    inner: DocumentWriter,
    calls: AtomicUsize,
    fail_on: usize,
}

#[async_trait]
impl ArtifactWriter for FailingWriter {
    async fn write(&self, post: &PostArtifact<'_>) -> crate::Result<Vec<PathBuf>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(ArtifactError::Write {
                path: self.inner.artifact_path(post.record_id, "md"),
                source: std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
            }
            .into());
        }
        self.inner.write(post).await
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn pipeline_with_writer(dataset: &Path, writer: Arc<dyn ArtifactWriter>) -> Pipeline {
    Pipeline::from_parts(
        RecordStore::new(DatasetConfig {
            path: dataset.to_path_buf(),
            ..Default::default()
        }),
        MetadataExtractor::new(ExtractorConfig {
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap(),
        ContentGenerator::new(GeneratorConfig::default()).unwrap(),
        writer,
    )
}

fn write_dataset(temp_dir: &TempDir, rows: &[&str]) -> PathBuf {
    let path = temp_dir.path().join("input.csv");
    let mut contents = format!("{HEADER}\n");
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn write_failure_aborts_without_commit() {
    let temp_dir = TempDir::new().unwrap();
    let dataset = write_dataset(
        &temp_dir,
        &[
            "1,http://127.0.0.1:1/track/first1,NEW",
            "2,http://127.0.0.1:1/track/second2,NEW",
        ],
    );
    let before = std::fs::read_to_string(&dataset).unwrap();
    let out = temp_dir.path().join("out");
    let writer = Arc::new(FailingWriter {
        inner: DocumentWriter::new(&out, ""),
        calls: AtomicUsize::new(0),
        fail_on: 2,
    });

    let pipeline = pipeline_with_writer(&dataset, writer);
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, Error::Artifact(ArtifactError::Write { .. })));
    assert!(out.join("1.md").exists(), "first artifact stays on disk");
    assert!(!out.join("2.md").exists());
    assert_eq!(
        std::fs::read_to_string(&dataset).unwrap(),
        before,
        "dataset must be untouched"
    );
}

#[tokio::test]
async fn skipped_record_stays_pending_and_others_commit() {
    let temp_dir = TempDir::new().unwrap();
    let dataset = write_dataset(
        &temp_dir,
        &[
            "a,https://open.spotify.com/album/xyz,NEW",
            "b,http://127.0.0.1:1/track/bbb222,NEW",
        ],
    );
    let out = temp_dir.path().join("out");
    let pipeline = pipeline_with_writer(&dataset, Arc::new(DocumentWriter::new(&out, "")));

    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.pending, 2);
    assert_eq!(summary.processed.iter().collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].id, "a");
    assert!(summary.committed);
    assert!(!out.join("a.md").exists());

    let rewritten = std::fs::read_to_string(&dataset).unwrap();
    assert!(rewritten.contains("a,https://open.spotify.com/album/xyz,NEW"));
    assert!(rewritten.contains("b,http://127.0.0.1:1/track/bbb222,DONE"));
}

#[tokio::test]
async fn all_skipped_means_no_commit() {
    let temp_dir = TempDir::new().unwrap();
    let dataset = write_dataset(&temp_dir, &["a,not-a-track-url,NEW"]);
    let before = std::fs::read(&dataset).unwrap();
    let pipeline = pipeline_with_writer(
        &dataset,
        Arc::new(DocumentWriter::new(temp_dir.path().join("out"), "")),
    );

    let summary = pipeline.run().await.unwrap();

    assert!(summary.processed.is_empty());
    assert!(!summary.committed);
    assert_eq!(std::fs::read(&dataset).unwrap(), before);
}

#[tokio::test]
async fn events_follow_record_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let dataset = write_dataset(
        &temp_dir,
        &[
            "1,http://127.0.0.1:1/track/abc123,NEW",
            "2,no-track,NEW",
            "3,http://127.0.0.1:1/track/old,DONE",
        ],
    );
    let pipeline = pipeline_with_writer(
        &dataset,
        Arc::new(DocumentWriter::new(temp_dir.path().join("out"), "")),
    );
    let mut rx = pipeline.subscribe();

    pipeline.run().await.unwrap();

    let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    let kinds: Vec<_> = events
        .iter()
        .map(|e| serde_json::to_value(e).unwrap()["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        kinds,
        vec![
            "run_started",
            "record_started",
            "metadata_extracted",
            "content_generated",
            "artifacts_written",
            "record_started",
            "record_skipped",
            "dataset_committed",
            "run_finished",
        ]
    );

    assert!(matches!(events[0], Event::RunStarted { total: 3, pending: 2 }));
    assert!(matches!(events[2], Event::MetadataExtracted { degraded: true, .. }));
    assert!(matches!(events[3], Event::ContentGenerated { fallback: true, .. }));
    assert!(matches!(events[7], Event::DatasetCommitted { updated: 1 }));
}

#[tokio::test]
async fn process_record_reports_skip() {
    let temp_dir = TempDir::new().unwrap();
    let dataset = write_dataset(&temp_dir, &[]);
    let pipeline = pipeline_with_writer(
        &dataset,
        Arc::new(DocumentWriter::new(temp_dir.path().join("out"), "")),
    );

    let record = SourceRecord {
        id: "x".into(),
        track_url: "https://open.spotify.com/artist/123".into(),
        status: crate::types::RecordStatus::New,
        fields: vec![],
    };
    let outcome = pipeline.process_record(&record).await.unwrap();
    assert!(matches!(
        outcome,
        RecordOutcome::Skipped(ExtractError::NoTrackId { .. })
    ));
}

#[test]
fn new_rejects_invalid_config() {
    let mut config = Config::default();
    config.dataset.id_column = String::new();
    assert!(matches!(
        Pipeline::new(config),
        Err(Error::Config { .. })
    ));
}
