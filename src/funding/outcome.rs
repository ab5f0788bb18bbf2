// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Funding requests, outcomes and the rejection taxonomy.

use serde::{Deserialize, Serialize};

use crate::blockchain::LedgerError;

/// A request to fund `target_address` on `chain_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRequest {
    pub target_address: String,
    pub chain_id: String,
}

impl FundingRequest {
    pub fn new(target_address: impl Into<String>, chain_id: impl Into<String>) -> Self {
        Self {
            target_address: target_address.into(),
            chain_id: chain_id.into(),
        }
    }
}

/// Result of a single funding attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FundingOutcome {
    /// Target already holds at least half the funding amount; nothing was sent.
    #[serde(rename_all = "camelCase")]
    AlreadyFunded { observed_balance: String },
    /// A transfer was submitted and confirmed.
    #[serde(rename_all = "camelCase")]
    Funded {
        transaction_hash: String,
        confirming_block: u64,
        amount_sent: String,
    },
    /// The pipeline stopped before completing a transfer.
    Rejected { reason: RejectReason },
}

impl FundingOutcome {
    /// The `status` tag this outcome serializes with.
    pub fn status(&self) -> &'static str {
        match self {
            FundingOutcome::AlreadyFunded { .. } => "alreadyFunded",
            FundingOutcome::Funded { .. } => "funded",
            FundingOutcome::Rejected { .. } => "rejected",
        }
    }
}

/// Who is at fault for a rejection, and whether retrying can help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input or unsupported chain (client error).
    Validation,
    /// Operator-side condition; retrying will not help until it is fixed.
    ServiceUnavailable,
    /// Remote ledger failure; the client may retry.
    Transient,
}

/// Why a funding or balance request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", content = "details", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("invalid address")]
    InvalidAddress(String),

    #[error("unsupported chain")]
    UnsupportedChain(String),

    #[error("funding service not configured")]
    NotConfigured,

    #[error("funder underfunded")]
    FunderUnderfunded(String),

    #[error("funding failed")]
    FundingFailed(String),

    #[error("balance query failed")]
    BalanceUnavailable(String),
}

impl RejectReason {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RejectReason::InvalidAddress(_) | RejectReason::UnsupportedChain(_) => {
                ErrorKind::Validation
            }
            RejectReason::NotConfigured | RejectReason::FunderUnderfunded(_) => {
                ErrorKind::ServiceUnavailable
            }
            RejectReason::FundingFailed(_) | RejectReason::BalanceUnavailable(_) => {
                ErrorKind::Transient
            }
        }
    }

    /// Human-readable detail, safe to return to clients.
    pub fn details(&self) -> Option<String> {
        match self {
            RejectReason::InvalidAddress(address) => {
                Some(format!("{address:?} is not a valid EVM address"))
            }
            RejectReason::UnsupportedChain(chain_id) => {
                Some(format!("chain {chain_id:?} is not supported"))
            }
            RejectReason::NotConfigured => None,
            RejectReason::FunderUnderfunded(detail)
            | RejectReason::FundingFailed(detail)
            | RejectReason::BalanceUnavailable(detail) => Some(detail.clone()),
        }
    }

    /// Map a ledger failure hit while funding.
    pub fn from_funding_error(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds => {
                RejectReason::FunderUnderfunded("ledger reported insufficient funds".to_string())
            }
            other => RejectReason::FundingFailed(other.to_string()),
        }
    }
}
