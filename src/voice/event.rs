//! Events emitted by the voice sessions to the chat surface

use crate::locale::{Locale, Notice};

use super::recognition::RecognitionState;

/// Side effect produced by a voice session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// Recognition moved between idle and listening
    StateChanged {
        state: RecognitionState,
        locale: Locale,
    },
    /// A finalized transcript that should be submitted as a user message
    Transcript { text: String, locale: Locale },
    /// Inline notice to show as an assistant message
    Notice { notice: Notice, locale: Locale },
}

impl VoiceEvent {
    /// Localized notice text, if this is a notice
    #[must_use]
    pub const fn notice_text(&self) -> Option<&'static str> {
        match self {
            Self::Notice { notice, locale } => Some(notice.text(*locale)),
            _ => None,
        }
    }
}
