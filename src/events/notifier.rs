// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Best-effort fan-out of events to connected observers.
//!
//! Each observer owns a bounded channel. `publish` serializes the event once
//! and hands it to every channel with `try_send`: a full channel is skipped,
//! a closed one is pruned. There is no replay, so an observer only sees events
//! published while it is subscribed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

/// Messages buffered per observer before new events are dropped for it.
pub const OBSERVER_BUFFER: usize = 64;

/// Payload of `addressFunded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFunded {
    pub address: String,
    pub chain_id: String,
    pub amount: String,
    pub tx_hash: String,
    pub block_number: u64,
}

/// Events relayed over the push channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Event {
    #[serde(rename_all = "camelCase")]
    ConfigUpdated {
        chat_id: String,
        config: serde_json::Value,
    },
    AddressFunded(AddressFunded),
    WebhookReceived { data: serde_json::Value },
}

impl Event {
    /// Wire name of the event.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::ConfigUpdated { .. } => "configUpdated",
            Event::AddressFunded(_) => "addressFunded",
            Event::WebhookReceived { .. } => "webhookReceived",
        }
    }

    /// Serialize into the `{type, data, timestamp}` envelope.
    pub fn to_message(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&Envelope {
            kind: self.kind(),
            data: self,
            timestamp: Utc::now(),
        })
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a Event,
    timestamp: DateTime<Utc>,
}

/// A registered observer and its inbox.
pub struct Subscription {
    pub id: Uuid,
    pub receiver: mpsc::Receiver<String>,
}

/// Registry of connected observers.
#[derive(Clone, Default)]
pub struct EventNotifier {
    observers: Arc<RwLock<HashMap<Uuid, mpsc::Sender<String>>>>,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer.
    pub async fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(OBSERVER_BUFFER);
        let id = Uuid::new_v4();
        let total = {
            let mut observers = self.observers.write().await;
            observers.insert(id, tx);
            observers.len()
        };
        tracing::info!(observer_id = %id, total, "Observer connected");
        Subscription { id, receiver: rx }
    }

    /// Remove an observer. Unknown ids are ignored.
    pub async fn unsubscribe(&self, id: Uuid) {
        let removed = self.observers.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(observer_id = %id, "Observer disconnected");
        }
    }

    pub async fn observer_count(&self) -> usize {
        self.observers.read().await.len()
    }

    /// Deliver `event` to every connected observer.
    ///
    /// Returns how many observers accepted the message. Never fails: slow or
    /// vanished observers are skipped.
    pub async fn publish(&self, event: &Event) -> usize {
        let message = match event.to_message() {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(event = event.kind(), error = %e, "Failed to serialize event");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut closed = Vec::new();
        {
            let observers = self.observers.read().await;
            for (id, tx) in observers.iter() {
                match tx.try_send(message.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::debug!(observer_id = %id, event = event.kind(), "Observer lagging, event dropped");
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut observers = self.observers.write().await;
            for id in &closed {
                observers.remove(id);
            }
        }

        tracing::debug!(event = event.kind(), delivered, pruned = closed.len(), "Event published");
        delivered
    }
}
