// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};

use crate::{
    error::{ApiError, ErrorBody},
    funding::{BalanceReport, FundingOutcome, FundingRequest, FundingStatus},
    models::{BalanceResponse, CheckBalanceQuery, FundAddressRequest, FundAddressResponse},
    state::AppState,
};

/// Fund an address with the network's configured amount of native currency.
///
/// Nothing is sent when the address already holds at least half that amount.
#[utoipa::path(
    post,
    path = "/api/fund-address",
    request_body = FundAddressRequest,
    tag = "Funding",
    responses(
        (status = 200, description = "Address funded or already funded", body = FundAddressResponse),
        (status = 400, description = "Invalid address or unsupported chain", body = ErrorBody),
        (status = 500, description = "Funding unavailable or failed", body = ErrorBody)
    )
)]
pub async fn fund_address(
    State(state): State<AppState>,
    payload: Result<Json<FundAddressRequest>, JsonRejection>,
) -> Result<Json<FundAddressResponse>, ApiError> {
    let Json(payload) =
        payload.map_err(|e| ApiError::bad_request("invalid request").with_details(e.body_text()))?;
    let request = FundingRequest::new(payload.address, payload.chain_id.to_string());

    let outcome = state.engine.fund(&request).await;
    let network = state.engine.resolve(&request.chain_id).ok();
    let network_name = network.map(|n| n.name.clone()).unwrap_or_default();

    let status = outcome.status().to_string();
    let response = match outcome {
        FundingOutcome::Rejected { reason } => return Err(reason.into()),
        FundingOutcome::AlreadyFunded { observed_balance } => FundAddressResponse {
            status,
            address: request.target_address.trim().to_string(),
            chain_id: request.chain_id,
            network: network_name,
            transaction_hash: None,
            confirming_block: None,
            amount_sent: None,
            observed_balance: Some(observed_balance),
            explorer_url: None,
        },
        FundingOutcome::Funded {
            transaction_hash,
            confirming_block,
            amount_sent,
        } => FundAddressResponse {
            status,
            address: request.target_address.trim().to_string(),
            explorer_url: network.map(|n| n.tx_url(&transaction_hash)),
            chain_id: request.chain_id,
            network: network_name,
            transaction_hash: Some(transaction_hash),
            confirming_block: Some(confirming_block),
            amount_sent: Some(amount_sent),
            observed_balance: None,
        },
    };

    Ok(Json(response))
}

/// Read the native balance of an address.
#[utoipa::path(
    get,
    path = "/api/check-balance",
    params(
        ("address" = String, Query, description = "EVM address"),
        ("chainId" = String, Query, description = "Chain id")
    ),
    tag = "Funding",
    responses(
        (status = 200, description = "Balance", body = BalanceResponse),
        (status = 400, description = "Missing or invalid parameters", body = ErrorBody),
        (status = 500, description = "Ledger unavailable", body = ErrorBody)
    )
)]
pub async fn check_balance(
    State(state): State<AppState>,
    Query(query): Query<CheckBalanceQuery>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let (Some(address), Some(chain_id)) = (query.address, query.chain_id) else {
        return Err(ApiError::bad_request("address and chainId are required"));
    };

    let report = state.engine.check_balance(&address, &chain_id).await?;
    Ok(Json(report.into()))
}

impl From<BalanceReport> for BalanceResponse {
    fn from(report: BalanceReport) -> Self {
        Self {
            address: report.address,
            chain_id: report.chain_id,
            network: report.network,
            balance: report.balance,
            balance_wei: report.balance_wei,
            symbol: report.symbol,
        }
    }
}

/// Custodial wallet balance and funding feasibility on every network.
#[utoipa::path(
    get,
    path = "/api/funding-status",
    tag = "Funding",
    responses(
        (status = 200, description = "Funding status", body = FundingStatus)
    )
)]
pub async fn funding_status(State(state): State<AppState>) -> Json<FundingStatus> {
    Json(state.status.status().await)
}
