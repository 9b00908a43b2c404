//! Chat session: transcript, relay round-trips and spoken replies

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::locale::{self, Locale, Notice};
use crate::voice::{SynthesisSession, UtteranceOutcome, VoiceEvent};

use super::client::{ChatClient, ChatReply};
use super::transcript::{ChatMessage, Role, Transcript};

/// Handle to a reply being spoken in the background
pub type Playback = JoinHandle<Option<UtteranceOutcome>>;

/// One conversation with the relay
#[derive(Debug)]
pub struct ChatSession {
    client: ChatClient,
    transcript: Transcript,
    synthesis: Arc<SynthesisSession>,
    voice_output: bool,
    pending: watch::Sender<bool>,
}

impl ChatSession {
    #[must_use]
    pub fn new(client: ChatClient, synthesis: Arc<SynthesisSession>, voice_output: bool) -> Self {
        Self {
            client,
            transcript: Transcript::new(),
            synthesis,
            voice_output,
            pending: watch::Sender::new(false),
        }
    }

    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        self.transcript.messages()
    }

    #[must_use]
    pub const fn voice_output(&self) -> bool {
        self.voice_output
    }

    pub fn set_voice_output(&mut self, enabled: bool) {
        self.voice_output = enabled;
    }

    /// Whether a reply is outstanding
    #[must_use]
    pub fn is_pending(&self) -> bool {
        *self.pending.borrow()
    }

    /// Observe the pending-reply flag, e.g. to draw a placeholder
    #[must_use]
    pub fn subscribe_pending(&self) -> watch::Receiver<bool> {
        self.pending.subscribe()
    }

    /// Append the starter greeting and speak it when voice output is on
    pub fn greet(&mut self, locale: Locale) -> Option<Playback> {
        let greeting = locale::starter_greeting(locale);
        self.transcript.push(greeting, Role::Assistant, locale);
        self.speak(greeting, locale)
    }

    /// Append a notice as an assistant message
    pub fn notify(&mut self, notice: Notice, locale: Locale) {
        self.transcript.push(notice.text(locale), Role::Assistant, locale);
    }

    /// Send a user message and append whatever comes back
    ///
    /// Blank input is ignored. A relay reply is spoken when voice output is
    /// enabled; failures land in the transcript and are never spoken.
    pub async fn send_message(&mut self, text: &str, locale: Locale) -> Option<Playback> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.transcript.push(text, Role::User, locale);
        self.pending.send_replace(true);

        let result = self.client.send(text, locale).await;
        self.pending.send_replace(false);

        match result {
            Ok(ChatReply::Reply(reply)) => {
                self.transcript.push(reply.clone(), Role::Assistant, locale);
                self.speak(&reply, locale)
            }
            Ok(ChatReply::Error(error)) => {
                tracing::debug!(%error, "relay rejected message");
                self.transcript.push(format!("Error: {error}"), Role::Assistant, locale);
                None
            }
            Ok(ChatReply::Empty) => {
                self.transcript.push("No reply", Role::Assistant, locale);
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, endpoint = self.client.endpoint(), "relay request failed");
                self.transcript.push("Network error", Role::Assistant, locale);
                None
            }
        }
    }

    /// Speak an assistant message again in the locale it was written in
    ///
    /// Ignores voice output settings. Without a synthesis capability a
    /// localized notice is appended instead.
    pub fn replay(&mut self, index: usize) -> Option<Playback> {
        let message = self
            .transcript
            .get(index)
            .filter(|m| m.sender == Role::Assistant)?;
        let (text, locale) = (message.text.clone(), message.locale);

        if !self.synthesis.is_supported() {
            self.notify(Notice::VoiceOutputUnsupported, locale);
            return None;
        }

        Some(self.synthesis.speak_detached(text, locale))
    }

    /// React to an event from the voice controller
    ///
    /// Recognised transcripts are submitted as user messages; notices are
    /// shown as assistant messages.
    pub async fn handle_voice_event(&mut self, event: VoiceEvent) -> Option<Playback> {
        match event {
            VoiceEvent::Transcript { text, locale } => self.send_message(&text, locale).await,
            VoiceEvent::Notice { notice, locale } => {
                self.notify(notice, locale);
                None
            }
            VoiceEvent::StateChanged { .. } => None,
        }
    }

    fn speak(&self, text: &str, locale: Locale) -> Option<Playback> {
        if !self.voice_output || !self.synthesis.is_supported() {
            return None;
        }
        Some(self.synthesis.speak_detached(text.to_string(), locale))
    }
}
