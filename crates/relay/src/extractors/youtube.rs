// ABOUTME: YouTube extractor: video title from the watch page plus the caption transcript.
// ABOUTME: Transcripts come from the InnerTube player API and the timedtext XML it points to.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use serde_json::json;

use crate::classify::SiteKind;
use crate::error::RelayError;
use crate::extractors::Extractor;
use crate::formats::{decode_entities, meta_property, strip_tags};
use crate::resource::{fetch, FetchOptions};
use crate::result::Scraped;

const FAILURE_MESSAGE: &str = "Error fetching YouTube data";
const INVALID_VIDEO: &str = "Invalid YouTube URL or unable to extract video ID.";
const TRANSCRIPT_ERROR_PREFIX: &str = "Error fetching transcript";

const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static API_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).unwrap());

/// Extracts YouTube videos as title plus transcript.
#[derive(Debug, Clone)]
pub struct YouTubeExtractor {
    http: reqwest::Client,
    base: String,
    languages: Vec<String>,
    fetch_opts: FetchOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Video id of a YouTube URL.
///
/// `youtu.be/<id>` uses the path; `youtube.com/watch?v=<id>` (www, bare, or
/// mobile host) uses the `v` parameter. Anything else yields `None`.
pub fn video_id(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    match parsed.host_str()? {
        "youtu.be" => {
            let id = parsed.path().trim_start_matches('/');
            (!id.is_empty()).then(|| id.to_string())
        }
        "www.youtube.com" | "youtube.com" | "m.youtube.com" => parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty()),
        _ => None,
    }
}

impl YouTubeExtractor {
    pub fn new(
        http: reqwest::Client,
        base: impl Into<String>,
        languages: Vec<String>,
        fetch_opts: FetchOptions,
    ) -> Self {
        Self {
            http,
            base: base.into().trim_end_matches('/').to_string(),
            languages,
            fetch_opts,
        }
    }

    fn watch_url(&self, id: &str) -> String {
        format!("{}/watch?v={}", self.base, id)
    }

    /// The `og:title` of the video's watch page; `None` on any failure.
    pub async fn fetch_title(&self, url: &str) -> Option<String> {
        let page_url = match video_id(url) {
            Some(id) => self.watch_url(&id),
            None => url.to_string(),
        };
        match fetch(&self.http, &page_url, &self.fetch_opts).await {
            Ok(page) => meta_property(&Html::parse_document(&page.text()), "og:title"),
            Err(err) => {
                tracing::warn!(url = %page_url, error = %err, "error fetching YouTube title");
                None
            }
        }
    }

    /// The transcript as one line of text, or a message describing the failure.
    pub async fn fetch_transcript(&self, url: &str) -> String {
        let Some(id) = video_id(url) else {
            return INVALID_VIDEO.to_string();
        };
        match self.transcript(&id).await {
            Ok(text) => text,
            Err(err) => format!("{}: {}", TRANSCRIPT_ERROR_PREFIX, err),
        }
    }

    async fn transcript(&self, id: &str) -> Result<String, RelayError> {
        let watch_url = self.watch_url(id);
        let html = fetch(&self.http, &watch_url, &self.fetch_opts).await?.text();
        let api_key = innertube_api_key(&watch_url, &html)?;

        let tracks = self.caption_tracks(id, &api_key).await?;
        let track = pick_track(&watch_url, &tracks, &self.languages)?;
        tracing::debug!(
            video = id,
            language = %track.language_code,
            generated = track.is_generated(),
            "selected caption track"
        );

        let timedtext_url = track.base_url.replace("&fmt=srv3", "");
        let xml = fetch(&self.http, &timedtext_url, &self.fetch_opts).await?.text();
        let segments = parse_timedtext(&xml)
            .map_err(|e| RelayError::transcript(&watch_url, "malformed caption data", Some(e)))?;
        Ok(segments.join(" "))
    }

    async fn caption_tracks(&self, id: &str, api_key: &str) -> Result<Vec<CaptionTrack>, RelayError> {
        let player_url = format!("{}/youtubei/v1/player?key={}", self.base, api_key);
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": id,
        });

        let mut request = self.http.post(&player_url).json(&body);
        if let Some(timeout) = self.fetch_opts.timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|e| RelayError::from_reqwest(&player_url, "player request failed", e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::transcript(
                &player_url,
                format!("player request failed with HTTP status {}", status.as_u16()),
                None,
            ));
        }
        let player: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RelayError::transcript(&player_url, "unexpected player response", Some(e.into())))?;

        let playability = &player["playabilityStatus"];
        let status = playability["status"].as_str().unwrap_or_default();
        if status != "OK" {
            let reason = playability["reason"].as_str().unwrap_or(status);
            return Err(RelayError::transcript(
                &player_url,
                format!("video is unplayable ({})", reason),
                None,
            ));
        }

        let tracks = &player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"];
        if tracks.is_null() {
            return Err(RelayError::transcript(
                &player_url,
                "transcripts are disabled for this video",
                None,
            ));
        }
        serde_json::from_value(tracks.clone())
            .map_err(|e| RelayError::transcript(&player_url, "unexpected caption list", Some(e.into())))
    }
}

fn innertube_api_key(watch_url: &str, html: &str) -> Result<String, RelayError> {
    if let Some(caps) = API_KEY_RE.captures(html) {
        return Ok(caps[1].to_string());
    }
    if html.contains("class=\"g-recaptcha\"") {
        return Err(RelayError::transcript(
            watch_url,
            "too many requests from this IP (captcha required)",
            None,
        ));
    }
    Err(RelayError::transcript(
        watch_url,
        "could not find the InnerTube API key on the watch page",
        None,
    ))
}

/// Manually created tracks win over generated ones; within each group the
/// language order of `languages` decides.
fn pick_track<'a>(
    watch_url: &str,
    tracks: &'a [CaptionTrack],
    languages: &[String],
) -> Result<&'a CaptionTrack, RelayError> {
    for generated in [false, true] {
        for lang in languages {
            if let Some(track) = tracks
                .iter()
                .find(|t| t.is_generated() == generated && &t.language_code == lang)
            {
                return Ok(track);
            }
        }
    }

    let available = tracks
        .iter()
        .map(|t| t.language_code.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Err(RelayError::transcript(
        watch_url,
        format!(
            "no transcript found for languages [{}]; available: [{}]",
            languages.join(", "),
            available
        ),
        None,
    ))
}

/// Text of every `<text>` element, entities decoded and inline markup removed.
fn parse_timedtext(xml: &str) -> anyhow::Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"text" => current = Some(String::new()),
            Event::Text(e) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&e.decode()?);
                }
            }
            Event::GeneralRef(e) => {
                if let Some(buf) = current.as_mut() {
                    buf.push('&');
                    buf.push_str(&e.decode()?);
                    buf.push(';');
                }
            }
            Event::End(e) if e.name().as_ref() == b"text" => {
                if let Some(raw) = current.take() {
                    let text = strip_tags(&decode_entities(&raw));
                    let text = text.trim();
                    if !text.is_empty() {
                        segments.push(text.to_string());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(segments)
}

#[async_trait]
impl Extractor for YouTubeExtractor {
    fn kind(&self) -> SiteKind {
        SiteKind::YouTube
    }

    /// Fetch the title and the transcript concurrently within this one task,
    /// so latency is the slower of the two calls rather than their sum. The
    /// result is the same as running them one after the other.
    async fn extract(&self, url: &str) -> Result<Scraped, RelayError> {
        let (title, transcript) = tokio::join!(self.fetch_title(url), self.fetch_transcript(url));

        if title.is_none() || transcript.starts_with("Error") {
            tracing::warn!(
                url,
                has_title = title.is_some(),
                transcript = %transcript.chars().take(200).collect::<String>(),
                "YouTube extraction incomplete"
            );
            return Err(RelayError::extract(url, FAILURE_MESSAGE, None));
        }

        Ok(Scraped {
            title,
            url: url.to_string(),
            content: Some(transcript),
        })
    }
}
