// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::blockchain::{CustodialWallet, LedgerConnector, NetworkRegistry};
use crate::events::EventNotifier;
use crate::funding::{FundingEngine, StatusAggregator};
use crate::store::ConfigStore;

#[derive(Clone)]
pub struct AppState {
    pub configs: Arc<RwLock<ConfigStore>>,
    pub engine: Arc<FundingEngine>,
    pub status: Arc<StatusAggregator>,
    pub notifier: EventNotifier,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the funding services around one registry, one optional custodial
    /// wallet and one ledger connector.
    pub fn new(
        registry: NetworkRegistry,
        wallet: Option<CustodialWallet>,
        connector: Arc<dyn LedgerConnector>,
    ) -> Self {
        let registry = Arc::new(registry);
        let wallet = wallet.map(Arc::new);
        let notifier = EventNotifier::new();

        Self {
            configs: Arc::new(RwLock::new(ConfigStore::new())),
            engine: Arc::new(FundingEngine::new(
                registry.clone(),
                wallet.clone(),
                connector.clone(),
                notifier.clone(),
            )),
            status: Arc::new(StatusAggregator::new(registry, wallet, connector)),
            notifier,
            started_at: Instant::now(),
        }
    }
}
