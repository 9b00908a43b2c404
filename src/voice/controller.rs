//! Voice I/O session controller
//!
//! Owns the language selector, the recognition session and the synthesis
//! session for one chat session, and keeps them from racing each other:
//! a locale switch while listening restarts recognition under the new
//! locale, and every new utterance preempts the previous one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::VoiceConfig;
use crate::locale::{self, Locale};

use super::event::VoiceEvent;
use super::language::LanguageSelector;
use super::recognition::{RecognitionEvent, RecognitionService, RecognitionSession};
use super::synthesis::{SpeechSettings, SynthesisService, SynthesisSession, UtteranceOutcome};

/// Speech capabilities exposed by the host
#[derive(Clone, Default)]
pub struct VoiceCapabilities {
    pub recognition: Option<Arc<dyn RecognitionService>>,
    pub synthesis: Option<Arc<dyn SynthesisService>>,
}

impl VoiceCapabilities {
    /// A host without any speech engines
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for VoiceCapabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceCapabilities")
            .field("recognition", &self.recognition.is_some())
            .field("synthesis", &self.synthesis.is_some())
            .finish()
    }
}

/// Observable state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Listening(Locale),
}

/// Coordinates recognition, synthesis and the active locale
#[derive(Debug)]
pub struct VoiceController {
    language: LanguageSelector,
    recognition: RecognitionSession,
    synthesis: Arc<SynthesisSession>,
    settle_delay: Duration,
}

impl VoiceController {
    /// Create a controller and the receiver for its [`VoiceEvent`]s
    #[must_use]
    pub fn new(
        capabilities: VoiceCapabilities,
        config: &VoiceConfig,
    ) -> (Self, mpsc::UnboundedReceiver<VoiceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();

        tracing::debug!(?capabilities, locale = %config.default_locale, "voice controller created");

        let controller = Self {
            language: LanguageSelector::new(config.default_locale),
            recognition: RecognitionSession::new(capabilities.recognition, tx),
            synthesis: Arc::new(SynthesisSession::new(
                capabilities.synthesis,
                SpeechSettings::from(config),
            )),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        };

        (controller, rx)
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.recognition.is_listening() {
            SessionState::Listening(self.recognition.locale())
        } else {
            SessionState::Idle
        }
    }

    /// Active locale
    #[must_use]
    pub const fn current_locale(&self) -> Locale {
        self.language.current_locale()
    }

    /// Register a listener for locale changes
    pub fn subscribe_locale(&mut self, listener: impl Fn(Locale) + Send + Sync + 'static) {
        self.language.subscribe(listener);
    }

    /// Label for the microphone control in the current state
    #[must_use]
    pub fn mic_label(&self) -> &'static str {
        locale::mic_label(self.recognition.is_listening(), self.current_locale())
    }

    /// Shared handle to the synthesis session
    #[must_use]
    pub fn synthesis(&self) -> Arc<SynthesisSession> {
        Arc::clone(&self.synthesis)
    }

    /// Start listening in the active locale, or stop if already listening
    pub fn request_toggle(&mut self) {
        let locale = self.current_locale();
        self.recognition.toggle(locale);
    }

    /// Switch the active locale
    ///
    /// While listening, recognition is stopped, given the settle delay to
    /// release its handle, and restarted under the new locale.
    pub async fn on_locale_changed(&mut self, locale: Locale) {
        self.language.set_locale(locale);

        if !self.recognition.is_listening() {
            return;
        }

        tracing::debug!(%locale, delay = ?self.settle_delay, "restarting recognition for new locale");
        self.recognition.stop();
        tokio::time::sleep(self.settle_delay).await;
        self.recognition.start(self.current_locale());
    }

    /// Wait for the next recognition callback
    pub async fn next_event(&mut self) -> RecognitionEvent {
        self.recognition.next_event().await
    }

    /// Apply a recognition callback
    pub fn dispatch(&mut self, event: RecognitionEvent) {
        self.recognition.handle_event(event);
    }

    /// Speak `text` in `locale`, preempting the current utterance
    pub async fn speak(&self, text: &str, locale: Locale) -> Option<UtteranceOutcome> {
        self.synthesis.speak(text, locale).await
    }
}
