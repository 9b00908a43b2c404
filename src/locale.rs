//! Supported locales and the user-facing copy attached to them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported conversation language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English
    En,
    /// Bengali
    #[default]
    Bn,
}

impl Locale {
    /// All supported locales
    pub const ALL: [Self; 2] = [Self::En, Self::Bn];

    /// Short code sent over the wire (`en` / `bn`)
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Bn => "bn",
        }
    }

    /// Language tag handed to recognition and synthesis services
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::En => "en-US",
            Self::Bn => "bn-BD",
        }
    }

    /// Prefix used to match synthesis voices for this locale
    #[must_use]
    pub const fn voice_prefix(self) -> &'static str {
        self.code()
    }

    /// Normalize a language field from a relay request
    ///
    /// Only an explicit `bn` selects Bengali; anything else is English.
    #[must_use]
    pub fn from_request(language: Option<&str>) -> Self {
        match language {
            Some("bn") => Self::Bn,
            _ => Self::En,
        }
    }

    /// Parse a user-supplied value, falling back to the default locale
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    /// Accepts bare codes and region-qualified tags (`en-GB`, `bn_IN`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let primary = normalized
            .split(['-', '_'])
            .next()
            .unwrap_or_default();

        match primary {
            "en" => Ok(Self::En),
            "bn" => Ok(Self::Bn),
            _ => Err(format!("unsupported locale: {s}")),
        }
    }
}

/// Inline notices surfaced to the user as assistant messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// No speech recognition capability on this host
    VoiceInputUnsupported,
    /// No speech synthesis capability on this host
    VoiceOutputUnsupported,
    /// Recognition service reported an error
    RecognitionError,
}

impl Notice {
    /// Localized notice text
    #[must_use]
    pub const fn text(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::VoiceInputUnsupported, Locale::En) => {
                "This browser does not support voice input."
            }
            (Self::VoiceInputUnsupported, Locale::Bn) => {
                "এই ব্রাউজারটি ভয়েস ইনপুট সমর্থন করে না।"
            }
            (Self::VoiceOutputUnsupported, Locale::En) => {
                "Voice not supported in this browser."
            }
            (Self::VoiceOutputUnsupported, Locale::Bn) => "এই ব্রাউজারে ভয়েস সমর্থিত নেই।",
            (Self::RecognitionError, Locale::En) => "Voice recognition error",
            (Self::RecognitionError, Locale::Bn) => "ভয়েস শনাক্তকরণ সমস্যা",
        }
    }
}

/// Greeting shown (and optionally spoken) when a chat session opens
#[must_use]
pub const fn starter_greeting(locale: Locale) -> &'static str {
    match locale {
        Locale::En => "Hello \u{2014} how can I help? Describe your symptoms or use voice input.",
        Locale::Bn => "কিভাবে সাহায্য করতে পারি? আপনার লক্ষণ লিখুন অথবা ভয়েস দিন।",
    }
}

/// Microphone control label for the given listening state
#[must_use]
pub const fn mic_label(listening: bool, locale: Locale) -> &'static str {
    match (listening, locale) {
        (true, Locale::En) => "🔴 Listening...",
        (true, Locale::Bn) => "🔴 শোনা হচ্ছে...",
        (false, Locale::En) => "🎤 Start Voice",
        (false, Locale::Bn) => "🎤 ভয়েস শুরু করুন",
    }
}
