//! Track metadata extraction
//!
//! Turns a track URL into a [`TrackReference`] (pure, from the URL alone) and
//! best-effort [`DisplayMetadata`] scraped from the track page's Open Graph tags.
//! Only a URL without a `track/<id>` segment is a hard failure; every page
//! problem degrades to placeholder values.

use crate::config::ExtractorConfig;
use crate::error::{Error, ExtractError, Result};
use crate::types::{DisplayMetadata, MetadataSource, TrackReference};
use html_escape::decode_html_entities;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Song name substituted when the track page cannot be fetched
pub const SONG_NAME_UNAVAILABLE: &str = "曲名取得失敗";

/// Artist name substituted when the track page cannot be fetched
pub const ARTIST_NAME_UNAVAILABLE: &str = "アーティスト名取得失敗";

/// Artist name used when the page has no description tag
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

const TRACK_ID_PATTERN: &str = r"track/([a-zA-Z0-9]+)";
const META_TAG_PATTERN: &str = r#"(?is)<meta\b(?:[^>"']|"[^"]*"|'[^']*')*>"#;
const ATTRIBUTE_PATTERN: &str =
    r#"(?s)([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#;

const TITLE_PROPERTY: &str = "og:title";
const DESCRIPTION_PROPERTY: &str = "og:description";

/// Separator between artist and the rest of an `og:description` value
const DESCRIPTION_SEPARATOR: char = '·';

/// Result of a successful extraction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction {
    /// Display metadata (possibly placeholders)
    pub metadata: DisplayMetadata,
    /// Track id and embed markup
    pub track: TrackReference,
}

/// Extracts track references and display metadata
pub struct MetadataExtractor {
    /// HTTP client for fetching track pages
    http_client: reqwest::Client,
    config: ExtractorConfig,
    track_pattern: Regex,
    meta_tag: Regex,
    attribute: Regex,
}

impl MetadataExtractor {
    /// Create a new extractor
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                Error::config("extractor", format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            config,
            track_pattern: compile(TRACK_ID_PATTERN)?,
            meta_tag: compile(META_TAG_PATTERN)?,
            attribute: compile(ATTRIBUTE_PATTERN)?,
        })
    }

    /// Derive the track reference from a URL without any network access
    pub fn track_reference(
        &self,
        track_url: &str,
    ) -> std::result::Result<TrackReference, ExtractError> {
        let track_id = self
            .track_pattern
            .captures(track_url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ExtractError::NoTrackId {
                url: track_url.to_string(),
            })?;

        let embed_widget = format!(
            r#"<iframe style="border-radius:12px" src="{}/{}?utm_source=generator" width="100%" height="352" frameBorder="0" allowfullscreen="" allow="autoplay; clipboard-write; encrypted-media; fullscreen; picture-in-picture" loading="lazy"></iframe>"#,
            self.config.embed_base_url.trim_end_matches('/'),
            track_id
        );

        Ok(TrackReference {
            track_id,
            embed_widget,
        })
    }

    /// Extract the track reference and display metadata for a URL
    ///
    /// Once a track id is found this never fails: a page that cannot be
    /// fetched yields the `*_UNAVAILABLE` placeholders instead.
    pub async fn extract(
        &self,
        track_url: &str,
    ) -> std::result::Result<Extraction, ExtractError> {
        let track = self.track_reference(track_url)?;

        let metadata = match self.fetch_page(track_url).await {
            Ok(html) => self.parse_display_metadata(&html, &track.track_id),
            Err(e) => {
                warn!(url = %track_url, error = %e, "track page fetch failed, using placeholders");
                DisplayMetadata {
                    song_name: SONG_NAME_UNAVAILABLE.to_string(),
                    artist_name: ARTIST_NAME_UNAVAILABLE.to_string(),
                    source: MetadataSource::Fallback,
                }
            }
        };

        if !metadata.is_degraded() {
            info!(
                song = %metadata.song_name,
                artist = %metadata.artist_name,
                "extracted track metadata"
            );
        }

        Ok(Extraction { metadata, track })
    }

    /// Fetch the track page body
    async fn fetch_page(&self, track_url: &str) -> Result<String> {
        debug!(url = %track_url, "fetching track page");

        let response = self.http_client.get(track_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Other(format!(
                "track page returned HTTP {}: {}",
                status.as_u16(),
                track_url
            )));
        }

        Ok(response.text().await?)
    }

    /// Read song and artist from the page's Open Graph tags
    ///
    /// Missing tags fall back per field: `Track {id}` for the song and
    /// [`UNKNOWN_ARTIST`] for the artist.
    pub fn parse_display_metadata(&self, html: &str, track_id: &str) -> DisplayMetadata {
        let song_name = self
            .meta_content(html, TITLE_PROPERTY)
            .unwrap_or_else(|| format!("Track {}", track_id));

        let artist_name = self
            .meta_content(html, DESCRIPTION_PROPERTY)
            .map(|description| {
                description
                    .split(DESCRIPTION_SEPARATOR)
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            })
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

        DisplayMetadata {
            song_name,
            artist_name,
            source: MetadataSource::Page,
        }
    }

    /// `content` of the first `<meta property="...">` tag with the given property
    fn meta_content(&self, html: &str, property: &str) -> Option<String> {
        self.meta_tag.find_iter(html).find_map(|tag| {
            let attributes = self.attributes(tag.as_str());
            if attributes.get("property").map(String::as_str) != Some(property) {
                return None;
            }
            attributes
                .get("content")
                .map(|value| decode_html_entities(value).into_owned())
        })
    }

    /// Attribute map of a single tag; names are lower-cased, first occurrence wins
    fn attributes(&self, tag: &str) -> HashMap<String, String> {
        let mut attributes = HashMap::new();
        for caps in self.attribute.captures_iter(tag) {
            let Some(name) = caps.get(1) else { continue };
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            attributes
                .entry(name.as_str().to_ascii_lowercase())
                .or_insert(value);
        }
        attributes
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    regex::RegexBuilder::new(pattern)
        .size_limit(1024 * 1024)
        .build()
        .map_err(|e| Error::Other(format!("invalid pattern '{}': {}", pattern, e)))
}
