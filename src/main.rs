//! Talkback - push-to-talk voice chat client
//!
//! Enter toggles recording; the finished recording is uploaded to the
//! chat endpoint and the spoken reply is played back.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use talkback::audio::{CaptureConfig, CaptureHandle, CpalPlayer, Microphone};
use talkback::chat::HttpChatBackend;
use talkback::config::ClientConfig;
use talkback::pipeline::ChatLoop;

#[derive(Parser, Debug)]
#[command(name = "talkback", about = "Push-to-talk voice chat with a conversational backend")]
struct Args {
    /// Chat endpoint URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Conversation identifier sent with each recording
    #[arg(long)]
    session_id: Option<String>,

    /// Optional JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// List input devices and exit
    #[arg(long)]
    list_devices: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talkback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if args.list_devices {
        println!("Input devices:");
        for device in CaptureHandle::list_devices() {
            println!("  - {}", device);
        }
        return Ok(());
    }

    let mut config = args
        .config
        .as_deref()
        .map(ClientConfig::load)
        .unwrap_or_default();
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(session_id) = args.session_id {
        config.session_id = session_id;
    }

    tracing::info!("talkback v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("chat endpoint: {}", config.endpoint);
    tracing::info!("session: {}", config.session_id);

    let capture = Microphone::new(CaptureConfig {
        target_sample_rate: config.audio.sample_rate,
    });
    let backend = HttpChatBackend::new(config.endpoint.clone());
    let mut chat = ChatLoop::new(config, capture, backend, CpalPlayer);

    let mut status_rx = chat.subscribe();
    tokio::spawn(async move {
        while let Ok(status) = status_rx.recv().await {
            println!("{}", status.message());
        }
    });

    println!("Press Enter to start and stop recording, 'q' then Enter to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().eq_ignore_ascii_case("q") {
            break;
        }
        chat.toggle().await;
    }

    Ok(())
}
