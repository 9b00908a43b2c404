//! TOML configuration file loading
//!
//! Supports `~/.config/voice-chat-relay/config.toml` as a persistent config
//! source. All fields are optional; the file is a partial overlay on top of
//! defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct RelayConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Upstream language-model configuration
    #[serde(default)]
    pub upstream: UpstreamFileConfig,

    /// Voice session configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Port to listen on
    pub port: Option<u16>,

    /// Directory with the web UI assets
    pub static_dir: Option<String>,

    /// Longest accepted chat message, in characters
    pub max_message_chars: Option<usize>,
}

/// Upstream language-model configuration
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamFileConfig {
    pub api_key: Option<String>,

    /// OpenAI-compatible API base URL
    pub base_url: Option<String>,

    /// Model identifier (e.g. "gpt-3.5-turbo")
    pub model: Option<String>,

    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

/// Voice session configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Initial language ("en" or "bn")
    pub language: Option<String>,

    /// Speak assistant replies
    pub voice_output: Option<bool>,

    /// How long to wait for the voice catalog, in milliseconds
    pub voices_timeout_ms: Option<u64>,

    /// Pause between stopping and restarting recognition on a locale switch
    pub settle_delay_ms: Option<u64>,

    /// Speech rate multiplier
    pub speech_rate: Option<f32>,
}

/// Load the TOML config file from the standard path
///
/// Returns `RelayConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> RelayConfigFile {
    let Some(path) = config_file_path() else {
        return RelayConfigFile::default();
    };

    if !path.exists() {
        return RelayConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                RelayConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            RelayConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/voice-chat-relay/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("voice-chat-relay").join("config.toml"))
}
