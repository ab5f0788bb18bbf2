// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. Field names are camelCase on the wire and every type derives
//! `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Funding**: fund an address, read balances
//! - **Config**: per-client configuration documents
//! - **Webhook**: opaque payload relay

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Chain Id Parameter
// =============================================================================

/// Chain id as sent by clients: either `"97"` or `97`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChainIdParam {
    Text(String),
    Number(u64),
}

impl std::fmt::Display for ChainIdParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainIdParam::Text(id) => write!(f, "{}", id.trim()),
            ChainIdParam::Number(id) => write!(f, "{id}"),
        }
    }
}

// =============================================================================
// Funding Models
// =============================================================================

/// Request body for `POST /api/fund-address`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundAddressRequest {
    /// Target EVM address (`0x` + 40 hex characters)
    pub address: String,
    /// Target network
    pub chain_id: ChainIdParam,
}

/// Successful response of `POST /api/fund-address`.
///
/// `status` carries the funding outcome's tag: `funded` when a transfer was
/// confirmed and `alreadyFunded` when the target already held enough and
/// nothing was sent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FundAddressResponse {
    pub status: String,
    pub address: String,
    pub chain_id: String,
    pub network: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirming_block: Option<u64>,
    /// Amount sent in whole native units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_sent: Option<String>,
    /// Target balance observed before deciding not to send
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_balance: Option<String>,
    /// Block explorer link for the transfer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

/// Query of `GET /api/check-balance`. Both fields are required; they are
/// optional here so a missing one yields a JSON error instead of a plain-text
/// rejection.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckBalanceQuery {
    pub address: Option<String>,
    pub chain_id: Option<String>,
}

/// Response of `GET /api/check-balance`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub address: String,
    pub chain_id: String,
    pub network: String,
    /// Balance in whole native units
    pub balance: String,
    pub balance_wei: String,
    pub symbol: String,
}

// =============================================================================
// Config Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigQuery {
    pub chat_id: Option<String>,
}

/// Request body for `POST /config`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveConfigRequest {
    pub chat_id: String,
    #[schema(value_type = Object)]
    pub config: serde_json::Value,
}

// =============================================================================
// Webhook Models
// =============================================================================

/// Acknowledgement of `POST /webhook`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct WebhookAck {
    pub received: bool,
    /// Observers the payload was relayed to
    pub observers: usize,
}
