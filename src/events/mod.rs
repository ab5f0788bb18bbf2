// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Event relay to connected clients.

pub mod notifier;
pub mod websocket;

pub use notifier::{AddressFunded, Event, EventNotifier, Subscription, OBSERVER_BUFFER};
