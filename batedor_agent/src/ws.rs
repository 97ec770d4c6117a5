//! Websocket push endpoint plus static files for the browser viewer.

use std::io;
use std::net::SocketAddr;
use std::path::Path;

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::{debug, info};

use crate::hub::HubHandle;

#[derive(Clone)]
struct WsState {
    hub: HubHandle,
    cancel: CancellationToken,
}

pub fn router(hub: HubHandle, web_root: &Path, cancel: CancellationToken) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(web_root))
        .with_state(WsState { hub, cancel })
}

pub async fn bind(port: u16) -> io::Result<TcpListener> {
    TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port))).await
}

/// Serve until `cancel` fires, then drain open connections.
pub async fn serve(
    listener: TcpListener,
    hub: HubHandle,
    web_root: &Path,
    cancel: CancellationToken,
) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, root = %web_root.display(), "web sidecar listening");
    }
    let app = router(hub, web_root, cancel.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: WsState) {
    let Some((id, mut outbound)) = state.hub.subscribe().await else {
        debug!("hub stopped, refusing websocket");
        return;
    };
    debug!(%id, "websocket subscriber connected");
    let (mut sink, mut inbound) = socket.split();

    loop {
        tokio::select! {
            _ = state.cancel.cancelled() => break,
            msg = outbound.recv() => match msg {
                Some(js) => {
                    if sink.send(Message::Text(js.to_string())).await.is_err() {
                        break;
                    }
                }
                // Hub dropped us (slow consumer) or stopped.
                None => break,
            },
            frame = inbound.next() => match frame {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    state.hub.unregister(id).await;
    let _ = sink
        .send(Message::Close(Some(CloseFrame {
            code: axum::extract::ws::close_code::NORMAL,
            reason: "".into(),
        })))
        .await;
    debug!(%id, "websocket subscriber disconnected");
}
