//! Post text generation
//!
//! Asks a chat-completion service for a [`ContentBundle`] and falls back to a
//! fixed template whenever the service cannot deliver one. Callers always get
//! a complete bundle.

use crate::config::GeneratorConfig;
use crate::error::{Error, GenerationError, Result};
use crate::types::{ContentBundle, DisplayMetadata};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str =
    "あなたは音楽に詳しいプロのライターです。JSON形式で正確に出力してください。";

const CODE_FENCE_PATTERN: &str = r"```json\n?|\n?```";

/// Where a bundle came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentSource {
    /// Parsed from the service response
    Service,
    /// Built from the template
    Fallback {
        /// Why the service result was not used
        reason: String,
    },
}

/// A bundle together with its origin
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    /// The generated text
    pub bundle: ContentBundle,
    /// Service or template
    pub source: ContentSource,
}

impl Generated {
    /// True when the template was used
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, ContentSource::Fallback { .. })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Generates post text for a track
pub struct ContentGenerator {
    /// HTTP client for the chat-completion endpoint
    http_client: reqwest::Client,
    config: GeneratorConfig,
    code_fence: Regex,
}

impl ContentGenerator {
    /// Create a new generator
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                Error::config("generator", format!("Failed to create HTTP client: {}", e))
            })?;

        let code_fence = Regex::new(CODE_FENCE_PATTERN)
            .map_err(|e| Error::Other(format!("invalid code fence pattern: {}", e)))?;

        Ok(Self {
            http_client,
            config,
            code_fence,
        })
    }

    /// Produce a bundle for the track; never fails
    ///
    /// One request, no retry. Any failure (no key, transport, status, payload)
    /// switches to [`fallback_bundle`].
    pub async fn generate(&self, metadata: &DisplayMetadata) -> Generated {
        match self.request_bundle(metadata).await {
            Ok(bundle) => {
                info!("content generated by service");
                Generated {
                    bundle,
                    source: ContentSource::Service,
                }
            }
            Err(GenerationError::MissingCredential) => {
                warn!("API key not configured, using template content");
                Generated {
                    bundle: fallback_bundle(metadata),
                    source: ContentSource::Fallback {
                        reason: GenerationError::MissingCredential.to_string(),
                    },
                }
            }
            Err(e) => {
                warn!(error = %e, "content generation failed, using template content");
                Generated {
                    bundle: fallback_bundle(metadata),
                    source: ContentSource::Fallback {
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    /// The primary path: call the service and parse its answer
    pub async fn request_bundle(
        &self,
        metadata: &DisplayMetadata,
    ) -> std::result::Result<ContentBundle, GenerationError> {
        let api_key = self
            .config
            .credential()
            .ok_or(GenerationError::MissingCredential)?;

        let prompt = build_prompt(metadata);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(model = %self.config.model, url = %self.config.api_url, "requesting content");

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| GenerationError::MalformedPayload {
                reason: format!("response is not a chat completion: {}", e),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        self.parse_bundle(&content)
    }

    /// Strip code fences and parse the three-key object
    pub fn parse_bundle(
        &self,
        content: &str,
    ) -> std::result::Result<ContentBundle, GenerationError> {
        let stripped = self.code_fence.replace_all(content, "");
        serde_json::from_str(stripped.trim()).map_err(|e| GenerationError::MalformedPayload {
            reason: e.to_string(),
        })
    }
}

/// User prompt sent to the service
pub fn build_prompt(metadata: &DisplayMetadata) -> String {
    format!(
        r#"あなたは専門の音楽ライターです。以下の曲について、読者が興味を持つような魅力的なブログ紹介文（日本語で800字程度）と、SNS（X/Twitter）用の投稿文（ハッシュタグ付き、100文字以内）を生成してください。

[曲名]: {song}
[アーティスト名]: {artist}

以下のJSON形式で出力してください:
{{
  "title": "記事タイトル",
  "blog_content": "ブログ本文（800字程度）",
  "sns_post": "SNS投稿文（100文字以内、ハッシュタグ付き）"
}}"#,
        song = metadata.song_name,
        artist = metadata.artist_name,
    )
}

/// Template bundle built only from the track names
pub fn fallback_bundle(metadata: &DisplayMetadata) -> ContentBundle {
    let song = &metadata.song_name;
    let artist = &metadata.artist_name;
    ContentBundle {
        title: format!("{} - {}", song, artist),
        body: format!(
            "{}の「{}」をご紹介します。\n\nこの楽曲は、心に響く素晴らしいメロディと歌詞が特徴です。ぜひ聴いていただきたい一曲です。",
            artist, song
        ),
        social_post: format!("🎵 {} / {}\n\n#音楽 #NowPlaying", song, artist),
    }
}
