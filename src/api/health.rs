// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness report.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests.
    pub status: String,
    /// Connected WebSocket observers.
    pub observers: usize,
    /// Whether a custodial secret is configured.
    pub funding_configured: bool,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Health check endpoint handler.
///
/// Does not contact any ledger; use `/api/funding-status` for that.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        observers: state.notifier.observer_count().await,
        funding_configured: state.engine.is_configured(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::blockchain::{
        mock::{test_wallet, MockLedgerConnector},
        NetworkRegistry,
    };

    #[tokio::test]
    async fn health_reports_observers_and_configuration() {
        let connector = Arc::new(MockLedgerConnector::new());
        let state = AppState::new(
            NetworkRegistry::builtin().unwrap(),
            Some(test_wallet()),
            connector.clone(),
        );
        let _observer = state.notifier.subscribe().await;

        let Json(report) = health(State(state)).await;
        assert_eq!(report.status, "ok");
        assert_eq!(report.observers, 1);
        assert!(report.funding_configured);
        assert_eq!(connector.connect_count(), 0);
    }
}
