use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use types::TranscriptSegment;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// The Android player client is served caption track lists without the
// signature handshake the web client requires.
const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "20.10.38";

#[derive(Debug, Error)]
pub enum CaptionsError {
    #[error("transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("no transcript found for video {0}")]
    NoTranscriptFound(String),

    #[error("video {0} is unavailable")]
    VideoUnavailable(String),

    #[error("caption provider request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// One caption track the provider reports for a video.
#[derive(Debug, Clone)]
pub struct CaptionTrack {
    pub language_code: String,

    /// Human-readable language name, falling back to the code when the
    /// provider gives none
    pub language: String,

    pub is_generated: bool,

    base_url: String,
}

/// Client for the caption provider's track-list and cue endpoints.
#[derive(Debug, Clone)]
pub struct CaptionsClient {
    http_client: reqwest::Client,
    innertube_url: String,
}

impl CaptionsClient {
    #[must_use]
    pub const fn new(
        http_client: reqwest::Client,
        innertube_url: String,
    ) -> Self {
        Self {
            http_client,
            innertube_url,
        }
    }

    /// List the caption tracks available for a video.
    ///
    /// # Errors
    ///
    /// `VideoUnavailable` when the provider cannot play the video at all,
    /// `TranscriptsDisabled` when it reports no caption tracks, and
    /// `Request` for transport or decoding failures.
    pub async fn list_tracks(
        &self,
        video_id: &str,
    ) -> Result<Vec<CaptionTrack>, CaptionsError> {
        let player: PlayerResponse = self
            .http_client
            .post(format!("{}/youtubei/v1/player", self.innertube_url))
            .timeout(REQUEST_TIMEOUT)
            .json(&PlayerRequest::for_video(video_id))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(status) = &player.playability_status {
            if matches!(
                status.status.as_deref(),
                Some("ERROR" | "LOGIN_REQUIRED")
            ) {
                tracing::warn!(
                    "video {video_id} is not playable: {}",
                    status.reason.as_deref().unwrap_or("no reason given")
                );
                return Err(CaptionsError::VideoUnavailable(
                    video_id.to_string(),
                ));
            }
        }

        let tracks: Vec<CaptionTrack> = player
            .captions
            .and_then(|captions| captions.player_captions_tracklist_renderer)
            .and_then(|renderer| renderer.caption_tracks)
            .unwrap_or_default()
            .into_iter()
            .map(|raw| CaptionTrack {
                language: raw
                    .name
                    .and_then(TrackName::into_display)
                    .unwrap_or_else(|| raw.language_code.clone()),
                language_code: raw.language_code,
                is_generated: raw.kind.as_deref() == Some("asr"),
                base_url: raw.base_url,
            })
            .collect();

        if tracks.is_empty() {
            return Err(CaptionsError::TranscriptsDisabled(
                video_id.to_string(),
            ));
        }

        Ok(tracks)
    }

    /// Fetch the cues of one track: the first track matching `language`,
    /// or the provider-default (first listed) track when no language is
    /// given.
    ///
    /// # Errors
    ///
    /// `NoTranscriptFound` when the requested language has no track or the
    /// cues cannot be retrieved, plus everything `list_tracks` can return.
    pub async fn fetch_track(
        &self,
        video_id: &str,
        language: Option<&str>,
    ) -> Result<Vec<TranscriptSegment>, CaptionsError> {
        let tracks = self.list_tracks(video_id).await?;

        let track = match language {
            Some(code) => {
                tracks.iter().find(|track| track.language_code == code)
            }
            None => tracks.first(),
        }
        .ok_or_else(|| {
            CaptionsError::NoTranscriptFound(video_id.to_string())
        })?;

        self.fetch_cues(video_id, track).await
    }

    async fn fetch_cues(
        &self,
        video_id: &str,
        track: &CaptionTrack,
    ) -> Result<Vec<TranscriptSegment>, CaptionsError> {
        let response = self
            .http_client
            .get(&track.base_url)
            .query(&[("fmt", "json3")])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(
                "cue download for video {video_id} ({}) returned {}",
                track.language_code,
                response.status()
            );
            return Err(CaptionsError::NoTranscriptFound(
                video_id.to_string(),
            ));
        }

        let cues: CueListResponse = response.json().await?;

        let segments = cues
            .events
            .unwrap_or_default()
            .into_iter()
            .filter_map(|event| {
                let text: String = event
                    .segs?
                    .into_iter()
                    .filter_map(|seg| seg.utf8)
                    .collect();
                if text.is_empty() {
                    return None;
                }

                Some(TranscriptSegment {
                    text,
                    start: event.t_start_ms.unwrap_or(0.0) / 1000.0,
                    duration: event.d_duration_ms.unwrap_or(0.0) / 1000.0,
                })
            })
            .collect();

        Ok(segments)
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PlayerRequest<'a> {
    context: ClientContext,
    video_id: &'a str,
}

impl<'a> PlayerRequest<'a> {
    const fn for_video(video_id: &'a str) -> Self {
        Self {
            context: ClientContext {
                client: ClientInfo {
                    client_name: CLIENT_NAME,
                    client_version: CLIENT_VERSION,
                },
            },
            video_id,
        }
    }
}

#[derive(Serialize, Debug)]
struct ClientContext {
    client: ClientInfo,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ClientInfo {
    client_name: &'static str,
    client_version: &'static str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Deserialize, Debug)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    caption_tracks: Option<Vec<RawCaptionTrack>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct RawCaptionTrack {
    base_url: String,

    language_code: String,

    /// Set to "asr" on machine-generated tracks
    kind: Option<String>,

    name: Option<TrackName>,
}

// Track names arrive either as a plain string or as a list of text runs,
// depending on the client version the response was rendered for.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    runs: Option<Vec<TextRun>>,
}

#[derive(Deserialize, Debug)]
struct TextRun {
    text: Option<String>,
}

impl TrackName {
    fn into_display(self) -> Option<String> {
        if let Some(text) = self.simple_text {
            return Some(text);
        }

        let joined: String = self
            .runs?
            .into_iter()
            .filter_map(|run| run.text)
            .collect();
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

#[derive(Deserialize, Debug)]
struct CueListResponse {
    events: Option<Vec<CueEvent>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CueEvent {
    t_start_ms: Option<f64>,
    d_duration_ms: Option<f64>,
    segs: Option<Vec<CueSeg>>,
}

#[derive(Deserialize, Debug)]
struct CueSeg {
    utf8: Option<String>,
}
