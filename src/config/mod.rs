//! Configuration management for the voice chat relay

pub mod file;

use std::path::PathBuf;

use crate::locale::Locale;
use crate::{Error, Result};

use file::RelayConfigFile;

/// Default port, matching the web UI's expectations
pub const DEFAULT_PORT: u16 = 3000;

/// Default OpenAI-compatible API base URL
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com/v1";

/// Default upstream chat model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Longest accepted chat message, in characters
pub const MAX_MESSAGE_CHARS: usize = 8000;

/// Relay configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Upstream language-model configuration
    pub upstream: UpstreamConfig,

    /// Voice session configuration
    pub voice: VoiceConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Path to static files directory (web UI)
    pub static_dir: Option<PathBuf>,

    /// Longest accepted chat message, in characters
    pub max_message_chars: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            static_dir: None,
            max_message_chars: MAX_MESSAGE_CHARS,
        }
    }
}

/// Upstream language-model configuration
#[derive(Clone)]
pub struct UpstreamConfig {
    /// API key; without one the relay only serves canned replies
    pub api_key: Option<String>,

    /// OpenAI-compatible API base URL
    pub base_url: String,

    /// Chat model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Reply length limit
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_UPSTREAM_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 700,
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Voice session configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Locale selected when a session opens
    pub default_locale: Locale,

    /// Speak assistant replies
    pub voice_output: bool,

    /// Bounded wait for the synthesis voice catalog
    pub voices_timeout_ms: u64,

    /// Pause between stopping and restarting recognition on a locale switch
    pub settle_delay_ms: u64,

    /// Speech rate multiplier
    pub speech_rate: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            default_locale: Locale::Bn,
            voice_output: true,
            voices_timeout_ms: 1500,
            settle_delay_ms: 250,
            speech_rate: 0.95,
        }
    }
}

impl Config {
    /// Load configuration (env > toml > default)
    ///
    /// # Errors
    ///
    /// Returns error if the resulting configuration is invalid
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        let config = Self::from_sources(fc, |key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Merge a config file with an environment lookup
    #[must_use]
    pub fn from_sources(fc: RelayConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let server = ServerConfig {
            port: env("VOICE_CHAT_PORT")
                .or_else(|| env("PORT"))
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(defaults.server.port),
            static_dir: env("VOICE_CHAT_STATIC_DIR")
                .or(fc.server.static_dir)
                .map(PathBuf::from)
                .or_else(default_static_dir),
            max_message_chars: fc
                .server
                .max_message_chars
                .unwrap_or(defaults.server.max_message_chars),
        };

        let upstream = UpstreamConfig {
            api_key: env("OPENAI_API_KEY")
                .or(fc.upstream.api_key)
                .filter(|k| !k.trim().is_empty()),
            base_url: env("OPENAI_BASE_URL")
                .or(fc.upstream.base_url)
                .unwrap_or(defaults.upstream.base_url),
            model: env("VOICE_CHAT_MODEL")
                .or(fc.upstream.model)
                .unwrap_or(defaults.upstream.model),
            temperature: fc.upstream.temperature.unwrap_or(defaults.upstream.temperature),
            max_tokens: fc.upstream.max_tokens.unwrap_or(defaults.upstream.max_tokens),
            timeout_secs: fc
                .upstream
                .timeout_secs
                .unwrap_or(defaults.upstream.timeout_secs),
        };

        let voice = VoiceConfig {
            default_locale: env("VOICE_CHAT_LANGUAGE")
                .or(fc.voice.language)
                .map_or(defaults.voice.default_locale, |l| Locale::parse_or_default(&l)),
            voice_output: env("VOICE_CHAT_VOICE_OUTPUT")
                .and_then(|v| parse_bool(&v))
                .or(fc.voice.voice_output)
                .unwrap_or(defaults.voice.voice_output),
            voices_timeout_ms: fc
                .voice
                .voices_timeout_ms
                .unwrap_or(defaults.voice.voices_timeout_ms),
            settle_delay_ms: fc
                .voice
                .settle_delay_ms
                .unwrap_or(defaults.voice.settle_delay_ms),
            speech_rate: fc.voice.speech_rate.unwrap_or(defaults.voice.speech_rate),
        };

        Self {
            server,
            upstream,
            voice,
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns error describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.server.max_message_chars == 0 {
            return Err(Error::Config("max_message_chars must be positive".to_string()));
        }
        if !(0.1..=10.0).contains(&self.voice.speech_rate) {
            return Err(Error::Config(format!(
                "speech_rate {} out of range (0.1 to 10)",
                self.voice.speech_rate
            )));
        }
        if !(0.0..=2.0).contains(&self.upstream.temperature) {
            return Err(Error::Config(format!(
                "temperature {} out of range (0 to 2)",
                self.upstream.temperature
            )));
        }
        Ok(())
    }

    /// Whether an upstream model is configured
    #[must_use]
    pub const fn has_upstream(&self) -> bool {
        self.upstream.api_key.is_some()
    }
}

/// `./public` when it exists
fn default_static_dir() -> Option<PathBuf> {
    let dir = PathBuf::from("public");
    dir.is_dir().then_some(dir)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
