// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};

use crate::{
    error::{ApiError, ErrorBody},
    events::Event,
    models::{ConfigQuery, SaveConfigRequest},
    state::AppState,
    store::ConfigEntry,
};

#[utoipa::path(
    get,
    path = "/config",
    params(("chatId" = String, Query, description = "Client chat id")),
    tag = "Config",
    responses(
        (status = 200, body = ConfigEntry),
        (status = 400, description = "Missing chatId", body = ErrorBody),
        (status = 404, description = "No config stored", body = ErrorBody)
    )
)]
pub async fn get_config(
    State(state): State<AppState>,
    Query(query): Query<ConfigQuery>,
) -> Result<Json<ConfigEntry>, ApiError> {
    let chat_id = query
        .chat_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("chatId is required"))?;

    let store = state.configs.read().await;
    Ok(Json(store.get(&chat_id)?))
}

/// Store a client config and announce it as `configUpdated`.
#[utoipa::path(
    post,
    path = "/config",
    request_body = SaveConfigRequest,
    tag = "Config",
    responses(
        (status = 200, body = ConfigEntry),
        (status = 400, description = "Invalid body", body = ErrorBody)
    )
)]
pub async fn save_config(
    State(state): State<AppState>,
    payload: Result<Json<SaveConfigRequest>, JsonRejection>,
) -> Result<Json<ConfigEntry>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request("invalid request").with_details(e.body_text()))?;

    let entry = {
        let mut store = state.configs.write().await;
        store.upsert(request.chat_id, request.config)?
    };

    tracing::info!(chat_id = %entry.chat_id, "Config saved");
    state
        .notifier
        .publish(&Event::ConfigUpdated {
            chat_id: entry.chat_id.clone(),
            config: entry.config.clone(),
        })
        .await;

    Ok(Json(entry))
}
