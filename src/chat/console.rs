//! Interactive terminal chat

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::VoiceConfig;
use crate::locale::Locale;
use crate::voice::{VoiceCapabilities, VoiceController, VoiceEvent};
use crate::Result;

use super::client::ChatClient;
use super::session::ChatSession;
use super::transcript::{ChatMessage, Role};

const HELP: &str = "commands: /en /bn /mic /replay <n> /voice on|off /help /quit";

/// A line typed at the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    Locale(Locale),
    Mic,
    Replay(usize),
    Voice(bool),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; `None` for blank lines
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Some(Self::Say(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let command = match (parts.next(), parts.next()) {
            (Some("en"), None) => Self::Locale(Locale::En),
            (Some("bn"), None) => Self::Locale(Locale::Bn),
            (Some("mic"), None) => Self::Mic,
            (Some("replay"), Some(n)) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Self::Replay(n - 1),
                _ => Self::Help,
            },
            (Some("voice"), Some("on")) => Self::Voice(true),
            (Some("voice"), Some("off")) => Self::Voice(false),
            (Some("quit" | "exit"), None) => Self::Quit,
            _ => Self::Help,
        };
        Some(command)
    }
}

/// Run a chat session on stdin/stdout until `/quit` or end of input
///
/// # Errors
///
/// Returns error if the client cannot be built or stdin fails
pub async fn run(url: &str, config: &VoiceConfig, capabilities: VoiceCapabilities) -> Result<()> {
    let client = ChatClient::new(url)?;
    let (mut controller, mut events) = VoiceController::new(capabilities, config);
    let mut session = ChatSession::new(client, controller.synthesis(), config.voice_output);

    tracing::info!(endpoint = url, locale = %controller.current_locale(), "console started");
    println!("{HELP}");

    session.greet(controller.current_locale());
    let mut shown = render(session.messages(), 0);
    println!("{}", controller.mic_label());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some(command) = Command::parse(&line) else { continue };

                match command {
                    Command::Say(text) => {
                        println!("...");
                        session.send_message(&text, controller.current_locale()).await;
                    }
                    Command::Locale(locale) => {
                        controller.on_locale_changed(locale).await;
                        println!("language: {locale}");
                    }
                    Command::Mic => controller.request_toggle(),
                    Command::Replay(index) => {
                        if session.replay(index).is_none() {
                            tracing::debug!(index, "nothing to replay");
                        }
                    }
                    Command::Voice(enabled) => {
                        session.set_voice_output(enabled);
                        println!("voice output: {}", if enabled { "on" } else { "off" });
                    }
                    Command::Help => println!("{HELP}"),
                    Command::Quit => break,
                }
            }
            event = controller.next_event() => controller.dispatch(event),
            Some(event) = events.recv() => {
                if let VoiceEvent::StateChanged { .. } = event {
                    println!("{}", controller.mic_label());
                }
                session.handle_voice_event(event).await;
            }
        }

        shown = render(session.messages(), shown);
    }

    Ok(())
}

/// Print messages from `from` onward and return the new count
fn render(messages: &[ChatMessage], from: usize) -> usize {
    for (i, message) in messages.iter().enumerate().skip(from) {
        let who = match message.sender {
            Role::User => "you",
            Role::Assistant => "assistant",
        };
        println!("[{}] {who}: {}", i + 1, message.text);
    }
    messages.len()
}
