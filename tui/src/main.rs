use std::{fs::File, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use comms::transport::client::HttpClient;
use state_store::{StateStore, StoreConfig};
use termination::{create_termination, Interrupted, Terminator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use ui_management::UiManager;

mod state_store;
mod termination;
mod ui_management;

/// Terminal client for an N2N chat room.
///
/// Loads the room page once, then keeps the messages, the participants, the
/// invite drop-down and the invitation table up to date by polling.
#[derive(Debug, Parser)]
#[command(name = "n2n-chat-tui", version)]
struct Args {
    /// Base URL of the chat server
    #[arg(long, default_value = "http://localhost:8888")]
    server: String,

    /// Identifier of the room to open
    #[arg(long, default_value = "1")]
    room: String,

    /// Form password to send instead of the one found on the room page
    #[arg(long)]
    form_password: Option<String>,

    /// Milliseconds between two polls of every fragment
    #[arg(long, default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Where to write logs, the terminal belongs to the UI
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// logs go to a file, filtered with RUST_LOG
fn init_logging(path: PathBuf) -> anyhow::Result<()> {
    let file = File::create(&path)
        .with_context(|| format!("could not create the log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "n2n_chat_tui=debug,comms=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file)),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(
        args.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("n2n-chat-tui.log")),
    )?;

    let client = HttpClient::new(args.server.clone()).context("could not build the HTTP client")?;
    tracing::info!(server = client.base_url(), room = %args.room, "starting");

    let (terminator, mut interrupt_rx) = create_termination();
    let (state_store, state_rx) = StateStore::new(
        Arc::new(client),
        StoreConfig {
            server: args.server,
            room: args.room,
            poll_interval: Duration::from_millis(args.poll_interval_ms.max(1)),
            form_password: args.form_password,
        },
    );
    let (ui_manager, action_rx) = UiManager::new();

    tokio::try_join!(
        state_store.main_loop(terminator, action_rx, interrupt_rx.resubscribe()),
        ui_manager.main_loop(state_rx, interrupt_rx.resubscribe()),
    )?;

    if let Ok(reason) = interrupt_rx.recv().await {
        match reason {
            Interrupted::UserInt => println!("exited per user request"),
            Interrupted::OsSigInt => println!("exited because of an os sig int"),
        }
    } else {
        println!("exited because of an unexpected error");
    }

    Ok(())
}
