// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custodial wallet balance and funding feasibility per network.

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy::primitives::U256;
use futures_util::future::join_all;
use serde::Serialize;
use utoipa::ToSchema;

use crate::blockchain::{
    format_native, CustodialWallet, LedgerConnector, NetworkConfig, NetworkRegistry,
};

/// Overall funding status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FundingStatus {
    /// Whether a custodial secret is configured
    pub configured: bool,
    /// Custodial wallet address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funder_address: Option<String>,
    /// Status keyed by chain id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_network: Option<BTreeMap<String, NetworkStatus>>,
}

/// Status of one network. A failed query affects only its own entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    /// Network display name
    pub network: String,
    pub symbol: String,
    /// Custodial balance in whole native units
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_amount: Option<String>,
    /// Whether the custodian can cover one more funding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_fund: Option<bool>,
    /// Why the balance could not be read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NetworkStatus {
    fn available(network: &NetworkConfig, balance: U256) -> Self {
        Self {
            network: network.name.clone(),
            symbol: network.symbol.clone(),
            balance: Some(format_native(balance)),
            funding_amount: Some(network.funding_amount.clone()),
            can_fund: Some(balance >= network.funding_amount_wei),
            error: None,
        }
    }

    fn failed(network: &NetworkConfig, error: String) -> Self {
        Self {
            network: network.name.clone(),
            symbol: network.symbol.clone(),
            balance: None,
            funding_amount: None,
            can_fund: None,
            error: Some(error),
        }
    }

    pub fn is_available(&self) -> bool {
        self.error.is_none()
    }
}

/// Reports the custodian's position across every registered network.
pub struct StatusAggregator {
    registry: Arc<NetworkRegistry>,
    wallet: Option<Arc<CustodialWallet>>,
    connector: Arc<dyn LedgerConnector>,
}

impl StatusAggregator {
    pub fn new(
        registry: Arc<NetworkRegistry>,
        wallet: Option<Arc<CustodialWallet>>,
        connector: Arc<dyn LedgerConnector>,
    ) -> Self {
        Self {
            registry,
            wallet,
            connector,
        }
    }

    /// Query every network concurrently.
    ///
    /// Without a custodial wallet this returns immediately and touches no ledger.
    pub async fn status(&self) -> FundingStatus {
        let Some(wallet) = self.wallet.as_deref() else {
            return FundingStatus {
                configured: false,
                funder_address: None,
                per_network: None,
            };
        };

        let queries = self.registry.iter().map(|network| async move {
            let status = self.network_status(network, wallet).await;
            (network.chain_id.clone(), status)
        });
        let per_network = join_all(queries).await.into_iter().collect();

        FundingStatus {
            configured: true,
            funder_address: Some(wallet.address().to_checksum(None)),
            per_network: Some(per_network),
        }
    }

    async fn network_status(
        &self,
        network: &NetworkConfig,
        wallet: &CustodialWallet,
    ) -> NetworkStatus {
        let balance = match self.connector.connect(network, None).await {
            Ok(ledger) => ledger.get_balance(wallet.address()).await,
            Err(e) => Err(e),
        };

        match balance {
            Ok(balance) => NetworkStatus::available(network, balance),
            Err(e) => {
                tracing::warn!(
                    chain_id = %network.chain_id,
                    error = %e,
                    transient = e.is_transient(),
                    "Funding status query failed"
                );
                NetworkStatus::failed(network, e.to_string())
            }
        }
    }
}
