use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voice_chat_relay::api::ApiServerBuilder;
use voice_chat_relay::chat::{ChatClient, ChatReply, console};
use voice_chat_relay::voice::VoiceCapabilities;
use voice_chat_relay::{Config, Error, Locale, Responder};

/// Voice Chat Relay - bilingual voice chat relay for a language model
#[derive(Parser)]
#[command(name = "voice-chat", version, about)]
struct Cli {
    /// Port to listen on (overrides VOICE_CHAT_PORT / PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Directory with the web UI (overrides VOICE_CHAT_STATIC_DIR)
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the relay server (default)
    Serve,
    /// Send one message to a running relay and print the reply
    Ask {
        /// Message text
        message: String,
        /// Reply language (en or bn)
        #[arg(short, long)]
        language: Option<Locale>,
        /// Relay base URL
        #[arg(long, default_value = "http://localhost:3000")]
        url: String,
    },
    /// Interactive text chat against a running relay
    Console {
        /// Starting language (en or bn)
        #[arg(short, long)]
        language: Option<Locale>,
        /// Relay base URL
        #[arg(long, default_value = "http://localhost:3000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,voice_chat_relay=info",
        1 => "info,voice_chat_relay=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if cli.static_dir.is_some() {
        config.server.static_dir = cli.static_dir;
    }
    tracing::debug!(?config, "loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Ask {
            message,
            language,
            url,
        } => ask(&url, &message, language.unwrap_or(config.voice.default_locale)).await,
        Command::Console { language, url } => {
            if let Some(locale) = language {
                config.voice.default_locale = locale;
            }
            console::run(&url, &config.voice, VoiceCapabilities::none()).await?;
            Ok(())
        }
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        port = config.server.port,
        upstream = config.has_upstream(),
        "starting voice chat relay"
    );

    let responder = Responder::from_config(&config.upstream)?;
    let server = ApiServerBuilder::from_config(config, responder).build();

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}

async fn ask(url: &str, message: &str, locale: Locale) -> anyhow::Result<()> {
    let client = ChatClient::new(url)?;

    match client.send(message, locale).await? {
        ChatReply::Reply(reply) => println!("{reply}"),
        ChatReply::Error(error) => return Err(Error::Relay(error).into()),
        ChatReply::Empty => println!("No reply"),
    }

    Ok(())
}
