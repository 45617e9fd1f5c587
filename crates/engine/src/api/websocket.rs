//! WebSocket feed of session views.
//!
//! Front ends connect to `/ws` and receive every `SessionView` the engine
//! emits, optionally narrowed to one realm or player. The feed is
//! one-way; actions go through the HTTP routes.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use castline_domain::{PlayerId, RealmId, SessionView};

use crate::app::App;

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct ViewFilter {
    pub realm: Option<RealmId>,
    pub player: Option<PlayerId>,
}

impl ViewFilter {
    fn matches(&self, view: &SessionView) -> bool {
        self.realm.is_none_or(|realm| realm == view.realm_id)
            && self.player.is_none_or(|player| player == view.player_id)
    }
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app): State<Arc<App>>,
    Query(filter): Query<ViewFilter>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app, filter))
}

async fn handle_socket(socket: WebSocket, app: Arc<App>, filter: ViewFilter) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let connection_id = Uuid::new_v4();
    let mut views = app.adapters.presenter.subscribe();

    tracing::info!(
        connection_id = %connection_id,
        realm = ?filter.realm,
        player = ?filter.player,
        "WebSocket connection established"
    );

    // Forward views until the client goes away
    let send_task = tokio::spawn(async move {
        loop {
            let view = match views.recv().await {
                Ok(view) => view,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(connection_id = %connection_id, skipped, "View feed lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if !filter.matches(&view) {
                continue;
            }
            let json = match serde_json::to_string(&view) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize session view");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    send_task.abort();
    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}
