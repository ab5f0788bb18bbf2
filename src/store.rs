// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory per-client configuration store.
//!
//! Entries are keyed by chat id and live for the lifetime of the process.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;

/// A stored client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEntry {
    pub chat_id: String,
    /// Opaque client configuration document
    #[schema(value_type = Object)]
    pub config: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct ConfigStore {
    entries: HashMap<String, ConfigEntry>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chat_id: &str) -> Result<ConfigEntry, ApiError> {
        self.entries
            .get(chat_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Config not found"))
    }

    /// Insert or replace the entry for `chat_id`.
    pub fn upsert(
        &mut self,
        chat_id: impl Into<String>,
        config: serde_json::Value,
    ) -> Result<ConfigEntry, ApiError> {
        let chat_id = chat_id.into();
        if chat_id.trim().is_empty() {
            return Err(ApiError::bad_request("chatId must not be empty"));
        }

        let entry = ConfigEntry {
            chat_id: chat_id.clone(),
            config,
            updated_at: Utc::now(),
        };
        self.entries.insert(chat_id, entry.clone());
        Ok(entry)
    }
}
