//! Configuration types for autotune-reviewer

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Environment variable holding the generation service key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Source dataset location and column labels
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// CSV file holding the records (default: "scripts/input.csv")
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    /// Column holding the unique record id (default: "ID")
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Column holding the track URL (default: "Spotify_URL")
    #[serde(default = "default_url_column")]
    pub url_column: String,

    /// Column holding the NEW/DONE flag (default: "処理フラグ")
    #[serde(default = "default_status_column")]
    pub status_column: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            id_column: default_id_column(),
            url_column: default_url_column(),
            status_column: default_status_column(),
        }
    }
}

/// Track page fetching and embed rendering
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// User-Agent sent when fetching track pages
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Page fetch timeout (default: 10 seconds)
    #[serde(default = "default_page_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Base URL of the embeddable player; the track id is appended
    #[serde(default = "default_embed_base_url")]
    pub embed_base_url: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: default_page_timeout(),
            embed_base_url: default_embed_base_url(),
        }
    }
}

/// Chat-completion service settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Chat-completion endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Bearer credential (None = always use the template fallback)
    ///
    /// Never written back out when the config is serialized.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier (default: "gpt-4o")
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature (default: 0.7)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token cap (default: 2000)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout (default: 60 seconds)
    #[serde(default = "default_generation_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout: default_generation_timeout(),
        }
    }
}

impl GeneratorConfig {
    /// The configured key, treating an empty or blank value as absent
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Which artifacts are written per record
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// Markdown document only
    Document,
    /// Markdown document plus a JSON metadata sibling
    #[default]
    DocumentWithMetadata,
}

/// Output location and layout
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the artifacts (default: "data/posts")
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Artifact set written per record
    #[serde(default)]
    pub layout: OutputLayout,

    /// Prefix prepended to the record id in file names (default: none)
    #[serde(default)]
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            layout: OutputLayout::default(),
            file_prefix: String::new(),
        }
    }
}

/// Main configuration
///
/// Read once at start-up and handed to each component constructor. Nothing
/// mutates it during a run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source dataset
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Track page fetching
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Content generation service
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Output artifacts
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Site layout: `scripts/input.csv` in, `data/posts/{id}.md` + `{id}.json` out
    pub fn site() -> Self {
        Self::default()
    }

    /// Standalone layout: `input.csv` in, `output/post_{id}.md` out
    pub fn standalone() -> Self {
        Self {
            dataset: DatasetConfig {
                path: PathBuf::from("input.csv"),
                ..Default::default()
            },
            output: OutputConfig {
                dir: PathBuf::from("output"),
                layout: OutputLayout::Document,
                file_prefix: "post_".to_string(),
            },
            ..Default::default()
        }
    }

    /// Load a JSON configuration file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Overlay values from the process environment
    pub fn with_env(self) -> Self {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// Overlay values from an arbitrary lookup (used by [`Config::with_env`])
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV)
            && !key.trim().is_empty()
        {
            self.generator.api_key = Some(key);
        }
        self
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> Result<()> {
        let columns = [
            ("dataset.id_column", &self.dataset.id_column),
            ("dataset.url_column", &self.dataset.url_column),
            ("dataset.status_column", &self.dataset.status_column),
        ];
        for (key, value) in columns {
            if value.trim().is_empty() {
                return Err(Error::config(key, "column label must not be empty"));
            }
        }
        if self.generator.api_url.trim().is_empty() {
            return Err(Error::config(
                "generator.api_url",
                "endpoint must not be empty",
            ));
        }
        if self.generator.model.trim().is_empty() {
            return Err(Error::config("generator.model", "model must not be empty"));
        }
        if self.extractor.embed_base_url.trim().is_empty() {
            return Err(Error::config(
                "extractor.embed_base_url",
                "embed base URL must not be empty",
            ));
        }
        Ok(())
    }
}

// Default value functions
fn default_dataset_path() -> PathBuf {
    PathBuf::from("scripts/input.csv")
}

fn default_id_column() -> String {
    "ID".into()
}

fn default_url_column() -> String {
    "Spotify_URL".into()
}

fn default_status_column() -> String {
    "処理フラグ".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
}

fn default_page_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_embed_base_url() -> String {
    "https://open.spotify.com/embed/track".into()
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}

fn default_model() -> String {
    "gpt-4o".into()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_generation_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/posts")
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
