// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Funding Server - Custodial Multi-Chain Address Funding
//!
//! Funds user addresses with a fixed amount of native currency from a single
//! custodial wallet, on a fixed set of EVM test networks, and relays events
//! to WebSocket observers.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Network registry, ledger client and custodial signer
//! - `funding` - Funding decision engine and status aggregation
//! - `events` - Event fan-out and the WebSocket push channel
//! - `store` - In-memory per-client configuration

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod events;
pub mod funding;
pub mod models;
pub mod state;
pub mod store;
