//! HTTP client for the chat relay

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::locale::Locale;
use crate::Result;

/// What the relay answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// Assistant reply text
    Reply(String),
    /// Error string reported by the relay
    Error(String),
    /// Neither a reply nor an error
    Empty,
}

/// Client for `POST /chat`
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    /// Create a client for the relay at `base_url`
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat", base_url.trim_end_matches('/')),
        })
    }

    /// Relay endpoint URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send a message
    ///
    /// The payload decides the outcome regardless of status code, so
    /// validation errors come back as [`ChatReply::Error`].
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a relay payload
    pub async fn send(&self, message: &str, locale: Locale) -> Result<ChatReply> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RelayRequest {
                message,
                language: locale,
            })
            .send()
            .await?;

        let status = response.status();
        let payload: RelayPayload = response.json().await?;
        tracing::debug!(%status, "relay responded");

        Ok(match payload {
            RelayPayload {
                reply: Some(reply), ..
            } if !reply.is_empty() => ChatReply::Reply(reply),
            RelayPayload {
                error: Some(error), ..
            } => ChatReply::Error(error),
            _ => ChatReply::Empty,
        })
    }
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    message: &'a str,
    language: Locale,
}

#[derive(Deserialize)]
struct RelayPayload {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    error: Option<String>,
}
