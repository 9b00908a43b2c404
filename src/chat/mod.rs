//! Client side of the relay
//!
//! [`ChatSession`] keeps the transcript, talks to the relay through
//! [`ChatClient`] and hands replies to the voice layer for playback.

mod client;
pub mod console;
mod session;
mod transcript;

pub use client::{ChatClient, ChatReply};
pub use session::{ChatSession, Playback};
pub use transcript::{ChatMessage, Role, Transcript};
