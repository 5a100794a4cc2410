use crate::domain::model::Joke;
use crate::utils::error::{JokeError, RequestBuildError};
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_JOKE_URL: &str = "https://icanhazdadjoke.com/";
pub const DEFAULT_USER_AGENT: &str = concat!("dadjoke/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One-shot joke client. Every call to [`JokeFetcher::fetch`] issues exactly
/// one GET and keeps no state between calls.
#[derive(Debug, Clone)]
pub struct JokeFetcher {
    client: Client,
}

impl JokeFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client with the given total request timeout (`None` waits
    /// forever) and `User-Agent`.
    pub fn with_settings(timeout: Option<Duration>, user_agent: &str) -> Result<Self, JokeError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| JokeError::RequestConstruction(e.into()))?;
        Ok(Self::new(client))
    }

    pub async fn fetch(&self, url: &str) -> Result<String, JokeError> {
        // The URL parser strips tabs and newlines and percent-encodes other
        // control characters, so they would otherwise reach the wire.
        if let Some(c) = url.chars().find(|c| c.is_control()) {
            return Err(JokeError::RequestConstruction(
                RequestBuildError::ControlCharacter(c),
            ));
        }

        let request = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .build()
            .map_err(|e| JokeError::RequestConstruction(e.into()))?;

        tracing::debug!("Requesting joke from: {}", request.url());
        let response = self
            .client
            .execute(request)
            .await
            .map_err(JokeError::Transport)?;

        tracing::debug!("Joke API response status: {}", response.status());

        // `bytes()` consumes the response, so the connection is handed back
        // (or closed) on every path out of here.
        let body = response.bytes().await.map_err(JokeError::BodyRead)?;
        tracing::debug!("Read {} byte response body", body.len());

        let joke: Joke = serde_json::from_slice(&body).map_err(JokeError::Decode)?;
        Ok(joke.joke)
    }
}

/// Fetches a single joke from `url` with the default timeout and user agent.
pub async fn fetch_joke(url: &str) -> Result<String, JokeError> {
    JokeFetcher::with_settings(
        Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        DEFAULT_USER_AGENT,
    )?
    .fetch(url)
    .await
}
