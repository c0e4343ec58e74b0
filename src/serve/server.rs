// src/serve/server.rs

use std::path::PathBuf;

use anyhow::Context;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tracing::{debug, info};

use crate::errors::Result;
use crate::serve::reload::{ReloadHub, ReloadSignal};

/// Start the static-file server on the given port, serving `root` and
/// exposing the reload channel at `/__pipewright/reload`.
///
/// Runs until the listener fails; callers race it against shutdown.
pub async fn serve(root: PathBuf, port: u16, hub: ReloadHub) -> Result<()> {
    let app = Router::new()
        .route("/__pipewright/reload", get(reload_ws))
        .fallback_service(ServeDir::new(&root))
        .with_state(hub);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding dev server to port {port}"))?;

    info!(port, root = %root.display(), "dev server listening");

    axum::serve(listener, app)
        .await
        .context("dev server failed")?;

    Ok(())
}

async fn reload_ws(ws: WebSocketUpgrade, State(hub): State<ReloadHub>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_reload_socket(socket, hub.subscribe()))
}

/// Forward reload signals to one connected client until either side hangs up.
async fn handle_reload_socket(
    mut socket: WebSocket,
    mut signals: broadcast::Receiver<ReloadSignal>,
) {
    debug!("reload client connected");

    loop {
        tokio::select! {
            signal = signals.recv() => {
                let text = match signal {
                    Ok(ReloadSignal::Partial) => "reload",
                    Ok(ReloadSignal::Full) => "full-reload",
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "reload client lagged; collapsing to full reload");
                        "full-reload"
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if socket.send(Message::Text(text.to_string())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    // Clients only ever ping; ignore payloads.
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }
        }
    }

    debug!("reload client disconnected");
}
