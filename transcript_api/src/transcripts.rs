use std::collections::HashMap;

use types::{SingleTranscript, TranscriptSegment};

use crate::captions::{CaptionsClient, CaptionsError};

/// The sentinel preference entry meaning "the provider-default track is an
/// acceptable last resort". Never a real language code.
const AUTO_SENTINEL: &str = "auto";

/// Everything the response assembler needs from one video's caption fetch.
#[derive(Debug)]
pub struct TranscriptSet {
    /// Primary transcript, duplicated from the matching `all_transcripts`
    /// entry
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
    pub language: String,

    pub available_languages: Vec<String>,
    pub all_transcripts: Vec<SingleTranscript>,
}

/// Fetch one or more caption tracks for a video according to the language
/// preference policy.
///
/// The first track fetched successfully becomes the primary. When nothing
/// at all could be fetched, one unconstrained attempt is made for the
/// provider-default track, reported under the language code "auto".
///
/// # Errors
///
/// Fails only when no track could be fetched, with whatever the final
/// fallback attempt produced.
pub async fn fetch_transcripts(
    captions: &CaptionsClient,
    video_id: &str,
    languages: &[String],
    fetch_all: bool,
) -> Result<TranscriptSet, CaptionsError> {
    // Discovery. Failing here is not fatal: the fetch loop below then has
    // nothing to select from and the unconstrained fallback still runs.
    let mut available_languages = Vec::new();
    let mut track_info: HashMap<String, (String, bool)> = HashMap::new();

    match captions.list_tracks(video_id).await {
        Ok(tracks) => {
            for track in tracks {
                available_languages.push(track.language_code.clone());
                track_info.insert(
                    track.language_code,
                    (track.language, track.is_generated),
                );
            }
        }
        Err(e) => {
            tracing::warn!(
                "could not list caption tracks for video {video_id}: {e}"
            );
        }
    }

    let languages_to_fetch =
        select_languages(languages, &available_languages, fetch_all);

    let mut all_transcripts: Vec<SingleTranscript> = Vec::new();
    let mut primary: Option<(String, Vec<TranscriptSegment>, String)> = None;

    for language in &languages_to_fetch {
        let segments =
            match captions.fetch_track(video_id, Some(language)).await {
                Ok(segments) => segments,
                Err(
                    e @ (CaptionsError::NoTranscriptFound(_)
                    | CaptionsError::TranscriptsDisabled(_)),
                ) => {
                    tracing::warn!("skipping language {language}: {e}");
                    continue;
                }
                Err(e) => return Err(e),
            };

        let text = join_segments(&segments);
        let (language_name, is_generated) = track_info
            .get(language)
            .cloned()
            .unwrap_or_else(|| (language.clone(), false));

        all_transcripts.push(SingleTranscript {
            language: language.clone(),
            language_name: Some(language_name),
            is_generated,
            text: text.clone(),
            segments: segments.clone(),
        });

        if primary.is_none() {
            primary = Some((text, segments, language.clone()));
        }
    }

    // Nothing matched the preferences, or every attempt failed: one last
    // try with the provider-default track.
    if all_transcripts.is_empty() {
        let segments = captions.fetch_track(video_id, None).await?;
        let text = join_segments(&segments);

        all_transcripts.push(SingleTranscript {
            language: AUTO_SENTINEL.to_string(),
            language_name: Some("Auto-generated".to_string()),
            is_generated: true,
            text: text.clone(),
            segments: segments.clone(),
        });
        primary = Some((text, segments, AUTO_SENTINEL.to_string()));
    }

    let Some((text, segments, language)) = primary else {
        return Err(CaptionsError::NoTranscriptFound(video_id.to_string()));
    };

    Ok(TranscriptSet {
        text,
        segments,
        language,
        available_languages,
        all_transcripts,
    })
}

/// Decide which languages to fetch, in order.
///
/// With `fetch_all`, preferred languages that exist come first (in
/// preference order), then every other discovered language in discovery
/// order. Otherwise only the first preferred language that exists is
/// fetched.
fn select_languages(
    preferred: &[String],
    available: &[String],
    fetch_all: bool,
) -> Vec<String> {
    let mut selected = Vec::new();

    if fetch_all {
        for language in preferred {
            if language == AUTO_SENTINEL {
                continue;
            }
            if available.contains(language) {
                selected.push(language.clone());
            }
        }

        for language in available {
            if !selected.contains(language) {
                selected.push(language.clone());
            }
        }
    } else {
        for language in preferred {
            if language == AUTO_SENTINEL {
                continue;
            }
            if available.contains(language) {
                selected.push(language.clone());
                break;
            }
        }
    }

    selected
}

fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn fetch_all_prefers_then_appends_remaining() {
        let selected = select_languages(
            &codes(&["pl", "en", "de", "auto"]),
            &codes(&["en", "de"]),
            true,
        );

        assert_eq!(selected, codes(&["en", "de"]));
    }

    #[test]
    fn fetch_all_appends_unpreferred_languages_in_discovery_order() {
        let selected = select_languages(
            &codes(&["en", "auto"]),
            &codes(&["de", "en", "fr"]),
            true,
        );

        assert_eq!(selected, codes(&["en", "de", "fr"]));
    }

    #[test]
    fn single_mode_stops_at_first_available_preference() {
        let selected = select_languages(
            &codes(&["pl", "en"]),
            &codes(&["en", "de", "fr"]),
            false,
        );

        assert_eq!(selected, codes(&["en"]));
    }

    #[test]
    fn auto_sentinel_is_never_selected() {
        let selected = select_languages(
            &codes(&["auto"]),
            &codes(&["en", "auto"]),
            false,
        );

        assert_eq!(selected, Vec::<String>::new());
    }

    #[test]
    fn joins_segment_texts_with_single_spaces() {
        let segments = vec![
            TranscriptSegment {
                text: "never gonna".to_string(),
                start: 0.0,
                duration: 1.0,
            },
            TranscriptSegment {
                text: "let you down".to_string(),
                start: 1.0,
                duration: 1.0,
            },
        ];

        assert_eq!(join_segments(&segments), "never gonna let you down");
    }

    mod fetching {
        use super::*;

        fn track_entry(
            server: &wiremock::MockServer,
            code: &str,
            generated: bool,
        ) -> serde_json::Value {
            let mut entry = serde_json::json!({
                "baseUrl":
                    format!("{}/api/timedtext?lang={code}", server.uri()),
                "languageCode": code,
                "name": { "simpleText": code.to_uppercase() }
            });
            if generated {
                entry["kind"] = serde_json::json!("asr");
            }
            entry
        }

        async fn mount_player(
            server: &wiremock::MockServer,
            tracks: Vec<serde_json::Value>,
        ) {
            wiremock::Mock::given(wiremock::matchers::method("POST"))
                .and(wiremock::matchers::path("/youtubei/v1/player"))
                .respond_with(
                    wiremock::ResponseTemplate::new(200).set_body_json(
                        serde_json::json!({
                            "captions": {
                                "playerCaptionsTracklistRenderer": {
                                    "captionTracks": tracks
                                }
                            }
                        }),
                    ),
                )
                .mount(server)
                .await;
        }

        async fn mount_cues(
            server: &wiremock::MockServer,
            code: &str,
            texts: &[&str],
        ) {
            let events: Vec<serde_json::Value> = texts
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    serde_json::json!({
                        "tStartMs": i * 1000,
                        "dDurationMs": 1000,
                        "segs": [{ "utf8": text }]
                    })
                })
                .collect();

            wiremock::Mock::given(wiremock::matchers::method("GET"))
                .and(wiremock::matchers::path("/api/timedtext"))
                .and(wiremock::matchers::query_param("lang", code))
                .respond_with(
                    wiremock::ResponseTemplate::new(200).set_body_json(
                        serde_json::json!({ "events": events }),
                    ),
                )
                .mount(server)
                .await;
        }

        #[tokio::test]
        async fn fetches_preferred_languages_first_and_picks_primary() {
            let server = wiremock::MockServer::start().await;
            mount_player(
                &server,
                vec![
                    track_entry(&server, "de", true),
                    track_entry(&server, "en", false),
                ],
            )
            .await;
            mount_cues(&server, "en", &["hello", "world"]).await;
            mount_cues(&server, "de", &["hallo", "welt"]).await;

            let captions =
                CaptionsClient::new(reqwest::Client::new(), server.uri());
            let set = fetch_transcripts(
                &captions,
                "dQw4w9WgXcQ",
                &codes(&["pl", "en", "de", "auto"]),
                true,
            )
            .await
            .unwrap();

            // en is preferred over de even though de was discovered first
            assert_eq!(set.language, "en");
            assert_eq!(set.text, "hello world");
            assert_eq!(set.available_languages, codes(&["de", "en"]));

            let fetched: Vec<&str> = set
                .all_transcripts
                .iter()
                .map(|transcript| transcript.language.as_str())
                .collect();
            assert_eq!(fetched, vec!["en", "de"]);

            assert_eq!(
                set.all_transcripts[0].language_name.as_deref(),
                Some("EN")
            );
            assert!(set.all_transcripts[1].is_generated);
        }

        #[tokio::test]
        async fn failed_fetches_fall_back_to_default_track() {
            let server = wiremock::MockServer::start().await;
            mount_player(&server, vec![track_entry(&server, "en", false)])
                .await;
            mount_cues(&server, "en", &["first", "second"]).await;

            let captions =
                CaptionsClient::new(reqwest::Client::new(), server.uri());
            // nothing in the preference list is available
            let set = fetch_transcripts(
                &captions,
                "dQw4w9WgXcQ",
                &codes(&["pl", "auto"]),
                false,
            )
            .await
            .unwrap();

            assert_eq!(set.language, "auto");
            assert_eq!(set.all_transcripts.len(), 1);
            assert_eq!(
                set.all_transcripts[0].language_name.as_deref(),
                Some("Auto-generated")
            );
            assert!(set.all_transcripts[0].is_generated);
            assert_eq!(set.text, "first second");
        }

        #[tokio::test]
        async fn reports_not_found_when_every_attempt_fails() {
            let server = wiremock::MockServer::start().await;
            mount_player(
                &server,
                vec![
                    track_entry(&server, "en", false),
                    track_entry(&server, "de", false),
                    track_entry(&server, "fr", false),
                ],
            )
            .await;
            // no cue mocks mounted: every cue download 404s

            let captions =
                CaptionsClient::new(reqwest::Client::new(), server.uri());
            let error = fetch_transcripts(
                &captions,
                "dQw4w9WgXcQ",
                &codes(&["pl", "en"]),
                false,
            )
            .await
            .unwrap_err();

            assert!(matches!(error, CaptionsError::NoTranscriptFound(_)));
        }
    }
}
