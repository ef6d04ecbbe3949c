use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::Parser;
use n2n_chat_server::{
    room::{ChatRoomMetadata, PendingInvitation, Peer, RoomManagerBuilder},
    router, AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Development server for the N2N chat pages.
///
/// Serves the room page, the main page and their fragments from memory,
/// so the terminal client can be run without a node.
#[derive(Debug, Parser)]
#[command(name = "n2n-chat-server", version)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 8888)]
    port: u16,

    /// Name of the local user
    #[arg(long, default_value = "me")]
    username: String,

    /// Form password POSTs must carry; generated when omitted
    #[arg(long)]
    form_password: Option<String>,

    /// Rooms to create, numbered from 1 in the given order
    #[arg(long = "room", default_values_t = [String::from("general")])]
    rooms: Vec<String>,

    /// Peers that can be invited
    #[arg(long = "peer", default_values_t = [String::from("alice"), String::from("bob"), String::from("carol")])]
    peers: Vec<String>,

    /// Pending invitations, written as `room-name:invited-by`
    #[arg(long = "invitation", default_values_t = [String::from("rust-talk:dave")])]
    invitations: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "n2n_chat_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let form_password = args
        .form_password
        .clone()
        .unwrap_or_else(|| nanoid::nanoid!(16));

    let state = Arc::new(AppState::new(&form_password, build_rooms(&args)?));

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind to {addr}"))?;

    tracing::info!(%addr, username = %args.username, "listening");
    for (idx, name) in args.rooms.iter().enumerate() {
        tracing::info!(
            room = idx + 1,
            name = %name,
            "room page at http://localhost:{}/n2n-chat/display/?room={}",
            args.port,
            idx + 1
        );
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("server shut down");
    Ok(())
}

fn build_rooms(args: &Args) -> anyhow::Result<n2n_chat_server::room::RoomManager> {
    let mut builder = RoomManagerBuilder::new(&args.username);

    for (idx, name) in args.rooms.iter().enumerate() {
        builder = builder.create_room(ChatRoomMetadata::new(&(idx + 1).to_string(), name));
    }

    for name in &args.peers {
        builder = builder.add_peer(Peer::new(name));
    }

    // invitations get identifiers after the rooms so that accepting one never clashes
    for (idx, entry) in args.invitations.iter().enumerate() {
        let (room_name, invited_by) = entry
            .split_once(':')
            .with_context(|| format!("invitation '{entry}' is not written as room-name:invited-by"))?;

        builder = builder.receive_invitation(PendingInvitation {
            room: (args.rooms.len() + idx + 1).to_string(),
            room_name: String::from(room_name),
            username: args.username.clone(),
            invited_by: String::from(invited_by),
        });
    }

    Ok(builder.build())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for the interrupt signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("Server interrupted. Gracefully shutting down.");
}
