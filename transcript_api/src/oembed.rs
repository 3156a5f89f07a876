use std::time::Duration;

use serde::Deserialize;
use types::VideoMetadata;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_AUTHOR: &str = "Unknown Author";

#[derive(Deserialize, Debug)]
struct OembedResponse {
    title: Option<String>,
    author_name: Option<String>,
    thumbnail_url: Option<String>,
}

/// Fetch best-effort metadata for a video from the public embed-info
/// endpoint.
///
/// Never fails: any network or decoding problem degrades to placeholder
/// values, indistinguishable from a sparse successful lookup, so the
/// transcript request can still complete.
pub async fn fetch_metadata(
    http_client: &reqwest::Client,
    oembed_url: &str,
    video_id: &str,
) -> VideoMetadata {
    match request_embed_info(http_client, oembed_url, video_id).await {
        Ok(data) => VideoMetadata {
            video_id: video_id.to_string(),
            title: data.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            author: data
                .author_name
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            // the embed-info endpoint does not provide a description
            description: String::new(),
            thumbnail_url: data
                .thumbnail_url
                .unwrap_or_else(|| fallback_thumbnail_url(video_id)),
            duration_seconds: None,
            view_count: None,
            publish_date: None,
        },
        Err(e) => {
            tracing::warn!("metadata lookup failed, using placeholders: {e:?}");

            VideoMetadata {
                video_id: video_id.to_string(),
                title: UNKNOWN_TITLE.to_string(),
                author: UNKNOWN_AUTHOR.to_string(),
                description: String::new(),
                thumbnail_url: fallback_thumbnail_url(video_id),
                duration_seconds: None,
                view_count: None,
                publish_date: None,
            }
        }
    }
}

async fn request_embed_info(
    http_client: &reqwest::Client,
    oembed_url: &str,
    video_id: &str,
) -> Result<OembedResponse, reqwest::Error> {
    let watch_url = format!("https://www.youtube.com/watch?v={video_id}");

    http_client
        .get(oembed_url)
        .query(&[("url", watch_url.as_str()), ("format", "json")])
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json::<OembedResponse>()
        .await
}

fn fallback_thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn maps_embed_info_fields() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/oembed"))
            .and(wiremock::matchers::query_param(
                "url",
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            ))
            .and(wiremock::matchers::query_param("format", "json"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(
                    serde_json::json!({
                        "title": "Never Gonna Give You Up",
                        "author_name": "Rick Astley",
                        "thumbnail_url": "https://example.com/thumb.jpg"
                    }),
                ),
            )
            .mount(&server)
            .await;

        let metadata = fetch_metadata(
            &reqwest::Client::new(),
            &format!("{}/oembed", server.uri()),
            "dQw4w9WgXcQ",
        )
        .await;

        assert_eq!(metadata.video_id, "dQw4w9WgXcQ");
        assert_eq!(metadata.title, "Never Gonna Give You Up");
        assert_eq!(metadata.author, "Rick Astley");
        assert_eq!(metadata.description, "");
        assert_eq!(metadata.thumbnail_url, "https://example.com/thumb.jpg");
    }

    #[tokio::test]
    async fn falls_back_to_placeholders_on_server_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/oembed"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let metadata = fetch_metadata(
            &reqwest::Client::new(),
            &format!("{}/oembed", server.uri()),
            "dQw4w9WgXcQ",
        )
        .await;

        assert_eq!(metadata.title, "Unknown Title");
        assert_eq!(metadata.author, "Unknown Author");
        assert_eq!(
            metadata.thumbnail_url,
            "https://img.youtube.com/vi/dQw4w9WgXcQ/maxresdefault.jpg"
        );
    }

    #[tokio::test]
    async fn falls_back_to_placeholders_on_malformed_body() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/oembed"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_string("<html>not json</html>"),
            )
            .mount(&server)
            .await;

        let metadata = fetch_metadata(
            &reqwest::Client::new(),
            &format!("{}/oembed", server.uri()),
            "dQw4w9WgXcQ",
        )
        .await;

        assert_eq!(metadata.title, "Unknown Title");
        assert_eq!(metadata.author, "Unknown Author");
    }
}
