use figment::{providers::Env, Figment};
use serde::Deserialize;

use crate::captions::CaptionsClient;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Base url of the public embed-info endpoint used for metadata
    #[serde(default = "default_oembed_url")]
    pub oembed_url: String,

    /// Base url of the caption provider
    #[serde(default = "default_innertube_url")]
    pub innertube_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8765
}

fn default_oembed_url() -> String {
    "https://www.youtube.com/oembed".to_string()
}

fn default_innertube_url() -> String {
    "https://www.youtube.com".to_string()
}

pub fn load_config() -> Result<Config, figment::Error> {
    let figment = Figment::new().merge(Env::raw());

    figment.extract()
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    pub captions: CaptionsClient,
}

impl AppState {
    /// # Panics
    ///
    /// Panics if the shared HTTP client cannot be constructed.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!(
                "transcript-scraper/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("failed to create http client");

        Self {
            captions: CaptionsClient::new(
                http_client.clone(),
                config.innertube_url.clone(),
            ),
            http_client,
            config,
        }
    }
}
