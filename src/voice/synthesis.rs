//! Text-to-speech playback over a host-provided synthesis capability
//!
//! Playback is serialized through a single slot: a new utterance cancels
//! whatever the service is currently speaking before it is enqueued, so a
//! superseded utterance is dropped rather than queued behind the new one.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

use crate::config::VoiceConfig;
use crate::locale::Locale;
use crate::Result;

/// A voice offered by the synthesis service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// Language tag, e.g. `en-GB`
    pub lang: String,
}

impl Voice {
    #[must_use]
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }
}

/// One request to speak a text
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub locale: Locale,
    pub lang: &'static str,
    pub voice: Option<Voice>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// How an utterance left the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceOutcome {
    /// Played to the end
    Ended,
    /// Canceled before finishing
    Interrupted,
    /// The service reported an error
    Failed(String),
}

/// Host speech synthesis capability
pub trait SynthesisService: Send + Sync {
    /// Current voice catalog (may be empty while loading)
    fn voices(&self) -> Vec<Voice>;

    /// Notification fired whenever the voice catalog changes
    fn subscribe_voices_changed(&self) -> broadcast::Receiver<()>;

    /// Resume a paused output queue
    ///
    /// # Errors
    ///
    /// Returns error if the service rejects the request
    fn resume(&self) -> Result<()>;

    /// Drop every queued or playing utterance
    ///
    /// # Errors
    ///
    /// Returns error if the service rejects the request
    fn cancel(&self) -> Result<()>;

    /// Enqueue an utterance; the receiver resolves on its end-or-error callback
    ///
    /// # Errors
    ///
    /// Returns error if the utterance could not be enqueued
    fn speak(&self, utterance: Utterance) -> Result<oneshot::Receiver<UtteranceOutcome>>;
}

/// Fixed delivery parameters for every utterance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechSettings {
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub voices_timeout: Duration,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            rate: 0.95,
            pitch: 1.0,
            volume: 1.0,
            voices_timeout: Duration::from_millis(1500),
        }
    }
}

impl From<&VoiceConfig> for SpeechSettings {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            rate: config.speech_rate,
            voices_timeout: Duration::from_millis(config.voices_timeout_ms),
            ..Self::default()
        }
    }
}

/// Serialized speech playback
pub struct SynthesisSession {
    service: Option<Arc<dyn SynthesisService>>,
    settings: SpeechSettings,
    voices_ready: AtomicBool,
    next_ticket: AtomicU64,
    active: Mutex<Option<u64>>,
}

impl SynthesisSession {
    /// Create a session; `None` means the host has no synthesis capability
    #[must_use]
    pub fn new(service: Option<Arc<dyn SynthesisService>>, settings: SpeechSettings) -> Self {
        Self {
            service,
            settings,
            voices_ready: AtomicBool::new(false),
            next_ticket: AtomicU64::new(1),
            active: Mutex::new(None),
        }
    }

    /// Whether the host exposes a synthesis capability
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.service.is_some()
    }

    /// Whether an utterance currently holds the playback slot
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Wait until the voice catalog is populated or `timeout` elapses
    ///
    /// Returns immediately when voices are already known. Returns `false` only
    /// when the catalog is still empty or no synthesis capability exists.
    pub async fn ensure_voices_ready(&self, timeout: Duration) -> bool {
        let Some(service) = self.service.as_ref() else {
            return false;
        };

        if self.voices_ready.load(Ordering::Acquire) {
            return true;
        }

        // Subscribe before checking so a change in between is not missed
        let mut changed = service.subscribe_voices_changed();
        if !service.voices().is_empty() {
            self.voices_ready.store(true, Ordering::Release);
            return true;
        }

        match tokio::time::timeout(timeout, changed.recv()).await {
            Ok(Ok(()) | Err(broadcast::error::RecvError::Lagged(_))) => {
                tracing::debug!("voice catalog changed");
            }
            Ok(Err(broadcast::error::RecvError::Closed)) => {
                tracing::debug!("voice catalog notifications closed");
            }
            Err(_) => {
                tracing::debug!(?timeout, "timed out waiting for voices");
            }
        }

        let ready = !service.voices().is_empty();
        if ready {
            self.voices_ready.store(true, Ordering::Release);
        }
        ready
    }

    /// Speak `text` in `locale`, preempting anything currently playing
    ///
    /// Resolves once the utterance ends, is interrupted or fails. A request
    /// superseded while waiting for the voice catalog is never enqueued and
    /// resolves `Interrupted`. Returns `None` when the host cannot speak or the
    /// service refused the utterance. Failures are logged, never raised.
    pub async fn speak(&self, text: &str, locale: Locale) -> Option<UtteranceOutcome> {
        let Some(service) = self.service.clone() else {
            tracing::debug!("speech synthesis not supported");
            return None;
        };

        let ticket = self.acquire_slot();

        self.ensure_voices_ready(self.settings.voices_timeout).await;

        // No await between this check and `service.speak`
        if !self.owns_slot(ticket) {
            tracing::debug!(ticket, "utterance superseded before it was enqueued");
            return Some(UtteranceOutcome::Interrupted);
        }

        let voice = select_voice(&service.voices(), locale);
        let utterance = Utterance {
            text: text.to_string(),
            locale,
            lang: locale.tag(),
            voice,
            rate: self.settings.rate,
            pitch: self.settings.pitch,
            volume: self.settings.volume,
        };

        if let Err(e) = service.resume() {
            tracing::debug!(error = %e, "synthesis resume failed");
        }
        if let Err(e) = service.cancel() {
            tracing::debug!(error = %e, "synthesis cancel failed");
        }

        tracing::debug!(
            chars = text.chars().count(),
            lang = utterance.lang,
            voice = ?utterance.voice.as_ref().map(|v| &v.name),
            "speaking"
        );

        let outcome = match service.speak(utterance) {
            Ok(done) => match done.await {
                Ok(outcome) => Some(outcome),
                Err(_) => {
                    tracing::debug!("synthesis dropped utterance without a callback");
                    Some(UtteranceOutcome::Interrupted)
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "speak failed");
                None
            }
        };

        if let Some(UtteranceOutcome::Failed(reason)) = &outcome {
            tracing::warn!(%reason, "utterance failed");
        }

        self.release_slot(ticket);
        outcome
    }

    /// Speak on a background task so the caller is not held up by playback
    pub fn speak_detached(
        self: &Arc<Self>,
        text: String,
        locale: Locale,
    ) -> JoinHandle<Option<UtteranceOutcome>> {
        let session = Arc::clone(self);
        tokio::spawn(async move { session.speak(&text, locale).await })
    }

    fn acquire_slot(&self) -> u64 {
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = active.replace(ticket) {
            tracing::debug!(previous, ticket, "preempting utterance");
        }
        ticket
    }

    fn owns_slot(&self, ticket: u64) -> bool {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner) == Some(ticket)
    }

    fn release_slot(&self, ticket: u64) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if *active == Some(ticket) {
            *active = None;
        }
    }
}

impl std::fmt::Debug for SynthesisSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisSession")
            .field("supported", &self.is_supported())
            .field("settings", &self.settings)
            .field("voices_ready", &self.voices_ready.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Pick a voice: locale match, then English, then anything
#[must_use]
pub fn select_voice(voices: &[Voice], locale: Locale) -> Option<Voice> {
    let by_prefix = |prefix: &str| voices.iter().find(|v| v.lang.starts_with(prefix));

    by_prefix(locale.voice_prefix())
        .or_else(|| by_prefix(Locale::En.voice_prefix()))
        .or_else(|| voices.first())
        .cloned()
}
