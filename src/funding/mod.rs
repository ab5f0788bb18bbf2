// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Address funding: decision engine, outcomes and status reporting.

pub mod engine;
pub mod outcome;
pub mod status;

pub use engine::{parse_address, BalanceReport, FundingEngine, REQUIRED_CONFIRMATIONS};
pub use outcome::{ErrorKind, FundingOutcome, FundingRequest, RejectReason};
pub use status::{FundingStatus, NetworkStatus, StatusAggregator};
