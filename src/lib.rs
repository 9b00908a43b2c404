//! Voice Chat Relay - bilingual (English/Bengali) voice chat relay
//!
//! This library provides:
//! - An HTTP relay that forwards chat messages to an OpenAI-compatible model
//!   and falls back to canned replies
//! - Voice session coordination (recognition, synthesis, language switching)
//!   over host-provided speech engines
//! - A chat session client that keeps the transcript and speaks replies
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   Chat Session                       │
//! │  Transcript  │  Voice Controller  │  Chat Client     │
//! └────────────────────┬────────────────────────────────┘
//!                      │ POST /chat
//! ┌────────────────────▼────────────────────────────────┐
//! │                   Relay API                          │
//! │   Validation  │  Responder  │  Health  │  Static     │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │        Upstream model  │  Canned replies             │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod locale;
pub mod responder;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use locale::{Locale, Notice};
pub use responder::{ReplyProvider, Responder};
