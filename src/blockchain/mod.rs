// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the supported EVM networks.
//!
//! This module provides functionality for:
//! - Resolving supported networks by chain id
//! - Querying native balances
//! - Signing, broadcasting and confirming native transfers

pub mod client;
#[cfg(test)]
pub mod mock;
pub mod signing;
pub mod transactions;
pub mod types;

pub use client::{EvmConnector, Ledger, LedgerConnector, LedgerError, LedgerSettings};
pub use signing::{CustodialWallet, SigningError};
pub use transactions::{
    format_amount, format_native, parse_amount, AmountError, Confirmation, PendingTransfer,
    NATIVE_DECIMALS,
};
pub use types::*;
