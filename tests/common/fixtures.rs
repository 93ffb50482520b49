//! Dataset and track page fixtures

use autotune_reviewer::{Config, OutputLayout};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Header row in the default column layout
pub const HEADER: &str = "ID,Spotify_URL,処理フラグ";

/// Address nothing listens on; connections are refused immediately
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

/// Track page carrying Open Graph tags the way the real site does
pub const TRACK_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="utf-8">
  <meta property="og:title" content="Blinding Lights">
  <meta property="og:description" content="The Weeknd · After Hours · Song · 2020">
  <meta property="og:type" content="music.song">
  <title>Blinding Lights - song by The Weeknd | Spotify</title>
</head>
<body></body>
</html>"#;

/// A scratch workspace: dataset file plus output directory
pub struct Workspace {
    /// Owns the directory; dropped with the workspace
    pub temp_dir: TempDir,
    /// Dataset path
    pub dataset: PathBuf,
    /// Output directory
    pub output: PathBuf,
}

impl Workspace {
    /// Create a workspace whose dataset holds `rows` under [`HEADER`]
    pub fn with_rows(rows: &[String]) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let dataset = temp_dir.path().join("input.csv");
        let output = temp_dir.path().join("posts");

        let mut contents = format!("{HEADER}\n");
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        std::fs::write(&dataset, contents).expect("Failed to write dataset");

        Self {
            temp_dir,
            dataset,
            output,
        }
    }

    /// Configuration pointing at this workspace, without a generation key
    pub fn config(&self, layout: OutputLayout) -> Config {
        let mut config = Config::default();
        config.dataset.path = self.dataset.clone();
        config.output.dir = self.output.clone();
        config.output.layout = layout;
        config.extractor.timeout = Duration::from_secs(2);
        config.generator.api_key = None;
        config
    }

    /// Current dataset text
    pub fn dataset_text(&self) -> String {
        std::fs::read_to_string(&self.dataset).expect("Failed to read dataset")
    }

    /// Path of an artifact in the output directory
    pub fn artifact(&self, name: &str) -> PathBuf {
        self.output.join(name)
    }

    /// Root of the scratch directory
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// One CSV row
pub fn row(id: &str, url: &str, status: &str) -> String {
    format!("{id},{url},{status}")
}

/// Start a server that serves [`TRACK_PAGE`] for `/track/{track_id}`
pub async fn track_page_server(track_id: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/track/{track_id}")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(TRACK_PAGE),
        )
        .mount(&server)
        .await;
    server
}
