// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    error::{ApiError, ErrorBody},
    events::Event,
    models::WebhookAck,
    state::AppState,
};

/// Relay an arbitrary JSON payload to connected observers as `webhookReceived`.
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "Webhook",
    responses(
        (status = 200, body = WebhookAck),
        (status = 400, description = "Body is not JSON", body = ErrorBody)
    )
)]
pub async fn receive_webhook(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<WebhookAck>, ApiError> {
    let Json(data) =
        payload.map_err(|e| ApiError::bad_request("invalid request").with_details(e.body_text()))?;

    let observers = state.notifier.publish(&Event::WebhookReceived { data }).await;
    tracing::debug!(observers, "Webhook relayed");

    Ok(Json(WebhookAck {
        received: true,
        observers,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::blockchain::{mock::MockLedgerConnector, NetworkRegistry};

    #[tokio::test]
    async fn webhook_payload_is_relayed_verbatim() {
        let state = AppState::new(
            NetworkRegistry::builtin().unwrap(),
            None,
            Arc::new(MockLedgerConnector::new()),
        );
        let mut observer = state.notifier.subscribe().await;

        let Json(ack) = receive_webhook(State(state), Ok(Json(json!({ "order": 12 }))))
            .await
            .unwrap();
        assert_eq!(ack.observers, 1);

        let message: serde_json::Value =
            serde_json::from_str(&observer.receiver.recv().await.unwrap()).unwrap();
        assert_eq!(message["type"], "webhookReceived");
        assert_eq!(message["data"]["data"]["order"], 12);
    }
}
