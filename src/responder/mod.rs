//! Reply generation for the chat relay
//!
//! An optional upstream provider answers first; the keyword-matched canned
//! table answers whenever the provider is missing, fails, or returns nothing.

mod canned;
mod openai;
mod prompt;

pub use canned::{canned_reply, default_reply};
pub use openai::OpenAiProvider;
pub use prompt::system_prompt;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::UpstreamConfig;
use crate::locale::Locale;
use crate::Result;

/// Upstream language-model provider
#[async_trait]
pub trait ReplyProvider: Send + Sync {
    /// Answer `message`, instructing the model to reply in `locale`
    ///
    /// # Errors
    ///
    /// Returns error if the upstream request fails
    async fn reply(&self, message: &str, locale: Locale) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Upstream provider with canned fallback
#[derive(Clone, Default)]
pub struct Responder {
    upstream: Option<Arc<dyn ReplyProvider>>,
}

impl Responder {
    /// Responder that only serves canned replies
    #[must_use]
    pub fn canned_only() -> Self {
        Self { upstream: None }
    }

    /// Responder backed by `provider`
    #[must_use]
    pub fn with_provider(provider: Arc<dyn ReplyProvider>) -> Self {
        Self {
            upstream: Some(provider),
        }
    }

    /// Build from configuration; without an API key only canned replies are served
    ///
    /// # Errors
    ///
    /// Returns error if the upstream client cannot be constructed
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        if config.api_key.is_none() {
            tracing::info!("no OPENAI_API_KEY found, using canned responses");
            return Ok(Self::canned_only());
        }

        let provider = OpenAiProvider::new(config)?;
        tracing::info!(model = %config.model, "upstream model configured");
        Ok(Self::with_provider(Arc::new(provider)))
    }

    /// Name of the upstream provider, if any
    #[must_use]
    pub fn upstream_name(&self) -> Option<&'static str> {
        self.upstream.as_ref().map(|p| p.name())
    }

    /// Produce a reply; never fails
    pub async fn respond(&self, message: &str, locale: Locale) -> String {
        if let Some(provider) = &self.upstream {
            match provider.reply(message, locale).await {
                Ok(reply) if !reply.trim().is_empty() => return reply,
                Ok(_) => {
                    tracing::warn!(provider = provider.name(), "upstream returned an empty reply");
                }
                Err(e) => {
                    tracing::error!(provider = provider.name(), error = %e, "upstream request failed");
                }
            }
        }

        canned_reply(message, locale).to_string()
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("upstream", &self.upstream_name())
            .finish()
    }
}
