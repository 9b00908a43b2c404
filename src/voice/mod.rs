//! Voice I/O
//!
//! Recognition and synthesis engines belong to the host and are injected as
//! trait objects; this module only coordinates them.

mod controller;
mod event;
mod language;
mod recognition;
mod synthesis;

pub use controller::{SessionState, VoiceCapabilities, VoiceController};
pub use event::VoiceEvent;
pub use language::LanguageSelector;
pub use recognition::{
    RecognitionConfig, RecognitionEvent, RecognitionHandle, RecognitionService,
    RecognitionSession, RecognitionSink, RecognitionState,
};
pub use synthesis::{
    SpeechSettings, SynthesisService, SynthesisSession, Utterance, UtteranceOutcome, Voice,
    select_voice,
};
