//! Speech-to-text session over a host-provided recognition capability
//!
//! The session only does bookkeeping: user calls request a transition and set
//! a provisional state, while the service's termination callbacks (delivered
//! as [`RecognitionEvent`]s) are the authority on when a run has ended.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::locale::{Locale, Notice};
use crate::Result;

use super::event::VoiceEvent;

/// Listening state of the recognition session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognitionState {
    #[default]
    Idle,
    Listening,
}

/// Settings applied to the recognition handle before each run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    /// Language tag, e.g. `bn-BD`
    pub lang: &'static str,
    /// Whether partial results are delivered
    pub interim_results: bool,
    /// Number of alternatives per result
    pub max_alternatives: u32,
}

impl RecognitionConfig {
    /// Single-shot, single-alternative configuration for `locale`
    #[must_use]
    pub const fn for_locale(locale: Locale) -> Self {
        Self {
            lang: locale.tag(),
            interim_results: false,
            max_alternatives: 1,
        }
    }
}

/// Termination callback from the recognition service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// Final transcript
    Result(String),
    /// The service failed; the run is over
    Error(String),
    /// The run ended without a result (silence, stop)
    End,
}

/// Channel the service uses to report events for one run
pub type RecognitionSink = mpsc::UnboundedSender<RecognitionEvent>;

/// Host speech recognition capability
pub trait RecognitionService: Send + Sync {
    /// Whether the host actually exposes recognition
    fn is_supported(&self) -> bool {
        true
    }

    /// Construct a recognition handle
    ///
    /// # Errors
    ///
    /// Returns error if the host refuses to create a handle
    fn create(&self) -> Result<Box<dyn RecognitionHandle>>;
}

/// A single recognizer owned by the session
pub trait RecognitionHandle: Send {
    /// Apply settings for the next run
    fn configure(&mut self, config: &RecognitionConfig);

    /// Begin listening, reporting this run's events to `events`
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer is already running or cannot start
    fn start(&mut self, events: RecognitionSink) -> Result<()>;

    /// Stop listening
    ///
    /// # Errors
    ///
    /// Returns error if the recognizer rejects the stop request
    fn stop(&mut self) -> Result<()>;
}

/// Manages the single recognition handle for a chat session
pub struct RecognitionSession {
    service: Option<Arc<dyn RecognitionService>>,
    handle: Option<Box<dyn RecognitionHandle>>,
    state: RecognitionState,
    locale: Locale,
    events: Option<mpsc::UnboundedReceiver<RecognitionEvent>>,
    delivered: bool,
    output: mpsc::UnboundedSender<VoiceEvent>,
}

impl RecognitionSession {
    /// Create a session; `None` means the host has no recognition capability
    #[must_use]
    pub fn new(
        service: Option<Arc<dyn RecognitionService>>,
        output: mpsc::UnboundedSender<VoiceEvent>,
    ) -> Self {
        Self {
            service,
            handle: None,
            state: RecognitionState::Idle,
            locale: Locale::default(),
            events: None,
            delivered: false,
            output,
        }
    }

    /// Whether the host exposes a recognition capability
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.service.as_ref().is_some_and(|s| s.is_supported())
    }

    /// Current (provisional) state
    #[must_use]
    pub const fn state(&self) -> RecognitionState {
        self.state
    }

    /// Locale of the current or most recent run
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.locale
    }

    /// Whether the session believes it is listening
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.state == RecognitionState::Listening
    }

    /// Start listening in `locale`
    ///
    /// Unsupported hosts get an inline notice instead of an error. Failures of
    /// the start primitive are logged; the service's callbacks settle the state.
    pub fn start(&mut self, locale: Locale) {
        let Some(service) = self.service.clone().filter(|s| s.is_supported()) else {
            tracing::info!(%locale, "speech recognition not supported");
            self.emit(VoiceEvent::Notice {
                notice: Notice::VoiceInputUnsupported,
                locale,
            });
            return;
        };

        if self.is_listening() {
            tracing::debug!(%locale, current = %self.locale, "recognition already listening");
            return;
        }

        if self.handle.is_none() {
            match service.create() {
                Ok(handle) => self.handle = Some(handle),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to create recognition handle");
                    return;
                }
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(rx);
        self.delivered = false;
        self.locale = locale;
        self.set_state(RecognitionState::Listening);

        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        handle.configure(&RecognitionConfig::for_locale(locale));
        match handle.start(tx) {
            Ok(()) => tracing::debug!(lang = locale.tag(), "recognition started"),
            Err(e) => {
                // No callback can arrive for a run that never started
                tracing::warn!(error = %e, %locale, "recognition start failed");
                self.events = None;
                self.set_state(RecognitionState::Idle);
            }
        }
    }

    /// Stop listening; a no-op when already idle
    pub fn stop(&mut self) {
        if !self.is_listening() {
            return;
        }

        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = handle.stop() {
                tracing::debug!(error = %e, "recognition stop failed");
            }
        }
        self.set_state(RecognitionState::Idle);
    }

    /// Stop if listening, otherwise start in `locale`
    pub fn toggle(&mut self, locale: Locale) {
        if self.is_listening() {
            self.stop();
        } else {
            self.start(locale);
        }
    }

    /// Wait for the next callback of the active run
    ///
    /// A run whose service dropped its sink without ending is reported as
    /// [`RecognitionEvent::End`]. Pends forever while no run is active, so it
    /// can sit in a `select!`.
    pub async fn next_event(&mut self) -> RecognitionEvent {
        if let Some(rx) = self.events.as_mut() {
            if let Some(event) = rx.recv().await {
                return event;
            }
            self.events = None;
            if self.is_listening() {
                tracing::debug!("recognition run closed without ending");
                return RecognitionEvent::End;
            }
        }
        std::future::pending().await
    }

    /// Apply a termination callback from the recognition service
    pub fn handle_event(&mut self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Result(text) => {
                if self.delivered {
                    tracing::debug!("ignoring extra recognition result");
                    return;
                }
                self.delivered = true;

                let text = text.trim();
                if text.is_empty() {
                    tracing::debug!("empty transcript, nothing to submit");
                    return;
                }

                tracing::info!(transcript = %text, locale = %self.locale, "speech recognized");
                self.emit(VoiceEvent::Transcript {
                    text: text.to_string(),
                    locale: self.locale,
                });
            }
            RecognitionEvent::Error(reason) => {
                tracing::error!(%reason, "speech recognition error");
                self.stop();
                self.emit(VoiceEvent::Notice {
                    notice: Notice::RecognitionError,
                    locale: self.locale,
                });
            }
            RecognitionEvent::End => {
                self.events = None;
                if self.is_listening() {
                    self.set_state(RecognitionState::Idle);
                }
            }
        }
    }

    fn set_state(&mut self, state: RecognitionState) {
        self.state = state;
        self.emit(VoiceEvent::StateChanged {
            state,
            locale: self.locale,
        });
    }

    fn emit(&self, event: VoiceEvent) {
        if self.output.send(event).is_err() {
            tracing::trace!("voice event receiver dropped");
        }
    }
}

impl std::fmt::Debug for RecognitionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionSession")
            .field("supported", &self.is_supported())
            .field("state", &self.state)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}
