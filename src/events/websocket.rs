// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! WebSocket push channel.
//!
//! Every socket becomes an observer of the [`EventNotifier`](super::EventNotifier)
//! for as long as it stays open. Client messages are not interpreted beyond
//! close frames and `ping` text.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::time::interval;

use crate::state::AppState;

/// Interval between server pings.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

fn connected_payload(observer_id: &uuid::Uuid) -> String {
    serde_json::json!({
        "type": "connected",
        "message": "Connected to event stream",
        "observerId": observer_id,
    })
    .to_string()
}

/// Upgrade handler for `GET /ws`.
pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let subscription = state.notifier.subscribe().await;
    let observer_id = subscription.id;
    let mut inbox = subscription.receiver;

    if sender
        .send(Message::Text(connected_payload(&observer_id).into()))
        .await
        .is_err()
    {
        state.notifier.unsubscribe(observer_id).await;
        return;
    }

    // Forward published events to the socket
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
                message = inbox.recv() => {
                    let Some(message) = message else { break };
                    if sender.send(Message::Text(message.into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                Message::Text(text) => {
                    tracing::debug!(observer_id = %observer_id, len = text.len(), "Client message ignored");
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.notifier.unsubscribe(observer_id).await;
}
