use axum::{
    extract::State, http::StatusCode, response::IntoResponse, Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::instrument;
use types::{BatchRequest, TranscriptRequest, TranscriptResponse};

use crate::captions::CaptionsError;
use crate::structs::AppState;
use crate::video_id::extract_video_id;
use crate::{oembed, transcripts};

const TRANSCRIPTS_DISABLED_MESSAGE: &str =
    "Transcripts are disabled for this video";
const NO_TRANSCRIPT_MESSAGE: &str = "No transcript found for this video";
const VIDEO_UNAVAILABLE_MESSAGE: &str = "Video is unavailable";

/// Failures that surface as HTTP errors rather than in-band responses.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{0}")]
    InvalidUrl(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[instrument]
pub async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "transcript-scraper",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[instrument]
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

#[instrument(skip(state))]
pub async fn transcript_handler(
    State(state): State<AppState>,
    Json(request): Json<TranscriptRequest>,
) -> impl IntoResponse {
    match process_video(
        &state,
        &request.url,
        &request.languages,
        request.fetch_all_languages,
    )
    .await
    {
        Ok(response) => {
            (StatusCode::OK, Json(json!(response))).into_response()
        }
        Err(RequestError::InvalidUrl(message)) => {
            tracing::warn!("rejecting transcript request: {message}");
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
                .into_response()
        }
        Err(e @ RequestError::Internal(_)) => {
            tracing::error!("transcript request failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[instrument(skip(state))]
pub async fn batch_handler(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Json<Vec<TranscriptResponse>> {
    let languages =
        request.languages.unwrap_or_else(batch_default_languages);

    let mut results = Vec::with_capacity(request.urls.len());

    // Videos are processed one at a time; a failure for one url becomes a
    // failed entry in its slot and never aborts the rest of the batch.
    for url in &request.urls {
        match process_video(&state, url, &languages, true).await {
            Ok(response) => results.push(response),
            Err(e) => {
                tracing::warn!("batch entry for {url} failed: {e}");
                results.push(TranscriptResponse {
                    success: false,
                    url: url.clone(),
                    video_id: String::new(),
                    error: Some(e.to_string()),
                    ..TranscriptResponse::default()
                });
            }
        }
    }

    Json(results)
}

fn batch_default_languages() -> Vec<String> {
    ["en", "pl", "de", "es", "fr", "auto"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Run the whole pipeline for one video: id extraction, metadata lookup,
/// caption fetching, response assembly.
///
/// Caption-level failures come back as `Ok` responses with
/// `success: false`; only unextractable input and unexpected provider
/// errors surface as `Err`.
async fn process_video(
    state: &AppState,
    url: &str,
    languages: &[String],
    fetch_all: bool,
) -> Result<TranscriptResponse, RequestError> {
    let video_id = extract_video_id(url)
        .map_err(|e| RequestError::InvalidUrl(e.to_string()))?;

    let metadata = oembed::fetch_metadata(
        &state.http_client,
        &state.config.oembed_url,
        &video_id,
    )
    .await;

    match transcripts::fetch_transcripts(
        &state.captions,
        &video_id,
        languages,
        fetch_all,
    )
    .await
    {
        Ok(set) => Ok(TranscriptResponse {
            success: true,
            url: url.to_string(),
            video_id,
            metadata: Some(metadata),
            transcript_text: Some(set.text),
            transcript_segments: Some(set.segments),
            transcript_language: Some(set.language),
            all_transcripts: Some(set.all_transcripts),
            available_languages: Some(set.available_languages),
            error: None,
        }),
        Err(CaptionsError::TranscriptsDisabled(_)) => {
            Ok(TranscriptResponse {
                success: false,
                url: url.to_string(),
                video_id,
                metadata: Some(metadata),
                available_languages: Some(Vec::new()),
                error: Some(TRANSCRIPTS_DISABLED_MESSAGE.to_string()),
                ..TranscriptResponse::default()
            })
        }
        Err(CaptionsError::NoTranscriptFound(_)) => Ok(TranscriptResponse {
            success: false,
            url: url.to_string(),
            video_id,
            metadata: Some(metadata),
            available_languages: Some(Vec::new()),
            error: Some(NO_TRANSCRIPT_MESSAGE.to_string()),
            ..TranscriptResponse::default()
        }),
        // no metadata on an unavailable video, not even placeholders
        Err(CaptionsError::VideoUnavailable(_)) => Ok(TranscriptResponse {
            success: false,
            url: url.to_string(),
            video_id,
            error: Some(VIDEO_UNAVAILABLE_MESSAGE.to_string()),
            ..TranscriptResponse::default()
        }),
        Err(e) => Err(RequestError::Internal(e.to_string())),
    }
}
