// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::Request,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    events,
    funding::{FundingStatus, NetworkStatus},
    models::{
        BalanceResponse, ChainIdParam, FundAddressRequest, FundAddressResponse, SaveConfigRequest,
        WebhookAck,
    },
    state::AppState,
    store::ConfigEntry,
};

pub mod config;
pub mod funding;
pub mod health;
pub mod webhook;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/fund-address", post(funding::fund_address))
        .route("/check-balance", get(funding::check_balance))
        .route("/funding-status", get(funding::funding_status));

    let routes = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/config", get(config::get_config).post(config::save_config))
        .route("/webhook", post(webhook::receive_webhook))
        .route("/ws", get(events::websocket::handler))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        funding::fund_address,
        funding::check_balance,
        funding::funding_status,
        config::get_config,
        config::save_config,
        webhook::receive_webhook,
        health::health
    ),
    components(
        schemas(
            ChainIdParam,
            FundAddressRequest,
            FundAddressResponse,
            BalanceResponse,
            FundingStatus,
            NetworkStatus,
            SaveConfigRequest,
            ConfigEntry,
            WebhookAck,
            ErrorBody,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Funding", description = "Address funding and balances"),
        (name = "Config", description = "Per-client configuration"),
        (name = "Webhook", description = "Event relay"),
        (name = "Health", description = "Liveness")
    )
)]
struct ApiDoc;
