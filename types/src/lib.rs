use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRequest {
    /// Video URL in any of the supported shapes, or a bare video id
    pub url: String,

    /// Preferred transcript languages, most preferred first. The sentinel
    /// value "auto" is not a language code; it marks that falling back to
    /// the provider-default track is acceptable.
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// When true, fetch every available language (preferred ones first)
    /// instead of only the first preferred language that exists.
    #[serde(default = "default_fetch_all_languages")]
    pub fetch_all_languages: bool,
}

fn default_languages() -> Vec<String> {
    ["pl", "en", "de", "es", "fr", "auto"]
        .into_iter()
        .map(String::from)
        .collect()
}

const fn default_fetch_all_languages() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Video URLs to process, in order
    pub urls: Vec<String>,

    /// Preferred transcript languages applied to every video in the batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
}

/// One timed caption cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,

    /// Offset from the start of the video, in seconds
    pub start: f64,

    /// How long the cue stays on screen, in seconds
    pub duration: f64,
}

/// One language's transcript for a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleTranscript {
    pub language: String,

    /// Human-readable language name, when the provider reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_name: Option<String>,

    /// Whether the track is machine-generated rather than human-authored
    #[serde(default)]
    pub is_generated: bool,

    /// All segment texts joined with single spaces, in segment order
    pub text: String,

    pub segments: Vec<TranscriptSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub video_id: String,

    pub title: String,

    pub author: String,

    pub description: String,

    pub thumbnail_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
}

/// Top-level result for one video.
///
/// Caption-level failures (disabled, nothing found, video gone) are
/// reported in-band with `success: false` and an `error` message; the
/// note-taking client always receives a response object per video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub success: bool,

    /// The url exactly as the caller supplied it
    pub url: String,

    pub video_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoMetadata>,

    /// Text of the primary transcript (first successfully fetched, in
    /// preference order)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_segments: Option<Vec<TranscriptSegment>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript_language: Option<String>,

    /// Every transcript that was fetched, primary included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_transcripts: Option<Vec<SingleTranscript>>,

    /// Every language code the provider reports for the video, whether or
    /// not it was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_languages: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
