/// Remote daily-image API client
///
/// One HTTP GET per fetch window. The API answers either a JSON array of
/// post records or a JSON object describing a failure (rate limit,
/// malformed parameters); the object shape is surfaced to the pages as a
/// reported error rather than a decode panic.

use serde_json::Value;
use thiserror::Error;

use crate::date::{format_date, Window};

use super::post::Post;

/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "STARGRAM_API_URL";
/// Environment variable holding the API access key.
pub const API_KEY_VAR: &str = "STARGRAM_API_KEY";

/// Connection settings for the remote API, read once at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
}

/// Startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

impl ApiConfig {
    /// Read the API endpoint and access key from the environment.
    ///
    /// A missing or empty setting is a startup error, never a silent
    /// empty string baked into request URLs.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ApiConfig {
            base_url: required_var(API_URL_VAR)?,
            api_key: required_var(API_KEY_VAR)?,
        })
    }
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Failures while pulling posts from the remote API.
///
/// Carried inside UI messages, hence the owned strings and `Clone`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The request itself failed (connection refused, DNS, broken pipe)
    #[error("network request failed: {0}")]
    Network(String),
    /// The API answered, but with an error object instead of a post list
    #[error("the API reported an error: {0}")]
    Api(String),
    /// The response body was not JSON we understand
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Pull all posts for a date window.
pub async fn fetch_window(
    client: reqwest::Client,
    config: ApiConfig,
    window: Window,
) -> Result<Vec<Post>, FetchError> {
    let start = format_date(window.start);
    let end = format_date(window.end);

    println!("🛰️  Fetching posts for {} .. {}", start, end);

    let response = client
        .get(&config.base_url)
        .query(&[
            ("api_key", config.api_key.as_str()),
            ("start_date", start.as_str()),
            ("end_date", end.as_str()),
        ])
        .send()
        .await?;

    let body: Value = response.json().await?;
    parse_body(body)
}

/// Shape a decoded response body into posts.
///
/// Anything that is not a JSON array counts as a reported API failure
/// and carries the raw payload for the error banner.
pub fn parse_body(body: Value) -> Result<Vec<Post>, FetchError> {
    match body {
        Value::Array(_) => {
            serde_json::from_value(body).map_err(|err| FetchError::Decode(err.to_string()))
        }
        other => Err(FetchError::Api(other.to_string())),
    }
}
