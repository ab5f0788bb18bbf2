// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger client for EVM networks.
//!
//! [`Ledger`] is the capability the funding engine talks to. A fresh ledger is
//! built per request through a [`LedgerConnector`], so calls against different
//! networks never share connection state.

use std::future::IntoFuture;
use std::time::Duration;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    transports::{RpcError, TransportError},
};
use async_trait::async_trait;

use super::signing::CustodialWallet;
use super::transactions::{Confirmation, PendingTransfer};
use super::types::NetworkConfig;

/// HTTP provider type for read-only queries (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// HTTP provider type that signs with the custodial wallet.
type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Remote ledger operations used by the funding engine.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Native balance of `address` in wei.
    async fn get_balance(&self, address: Address) -> Result<U256, LedgerError>;

    /// Sign and submit a native transfer from the custodial wallet.
    async fn send_value(&self, to: Address, amount: U256) -> Result<PendingTransfer, LedgerError>;

    /// Wait until `pending` is at least `min_confirmations` blocks deep.
    ///
    /// Never retries the submission; a timeout surfaces as [`LedgerError::Timeout`].
    async fn await_confirmation(
        &self,
        pending: &PendingTransfer,
        min_confirmations: u64,
    ) -> Result<Confirmation, LedgerError>;
}

/// Builds a [`Ledger`] for one network.
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    /// Connect to `network`. Without a signer the ledger can only read.
    async fn connect(
        &self,
        network: &NetworkConfig,
        signer: Option<&CustodialWallet>,
    ) -> Result<Box<dyn Ledger>, LedgerError>;
}

/// Timing limits applied to every ledger call.
#[derive(Debug, Clone, Copy)]
pub struct LedgerSettings {
    /// Upper bound for a single RPC round trip
    pub request_timeout: Duration,
    /// Upper bound for waiting on a confirmation
    pub confirmation_timeout: Duration,
    /// Delay between receipt polls
    pub poll_interval: Duration,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            confirmation_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_millis(1500),
        }
    }
}

/// Connector backed by alloy HTTP providers.
#[derive(Debug, Clone, Default)]
pub struct EvmConnector {
    settings: LedgerSettings,
}

impl EvmConnector {
    pub fn new(settings: LedgerSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl LedgerConnector for EvmConnector {
    async fn connect(
        &self,
        network: &NetworkConfig,
        signer: Option<&CustodialWallet>,
    ) -> Result<Box<dyn Ledger>, LedgerError> {
        let ledger = EvmLedger::new(network.clone(), signer, self.settings);
        Ok(Box::new(ledger))
    }
}

/// Ledger client for a single EVM network.
pub struct EvmLedger {
    /// Network configuration
    network: NetworkConfig,
    /// Read-only provider
    reader: HttpProvider,
    /// Provider with the custodial wallet attached, if any
    signer: Option<SigningProvider>,
    settings: LedgerSettings,
}

impl EvmLedger {
    /// Create a new client for the given network.
    pub fn new(
        network: NetworkConfig,
        wallet: Option<&CustodialWallet>,
        settings: LedgerSettings,
    ) -> Self {
        let reader = ProviderBuilder::new().connect_http(network.rpc_url.clone());
        let signer = wallet.map(|w| {
            ProviderBuilder::new()
                .wallet(w.ethereum_wallet())
                .connect_http(network.rpc_url.clone())
        });

        Self::with_providers(network, reader, signer, settings)
    }

    fn with_providers(
        network: NetworkConfig,
        reader: HttpProvider,
        signer: Option<SigningProvider>,
        settings: LedgerSettings,
    ) -> Self {
        Self {
            network,
            reader,
            signer,
            settings,
        }
    }

    /// Poll for the receipt until it is `required` blocks deep.
    async fn poll_confirmation(
        &self,
        pending: &PendingTransfer,
        required: u64,
    ) -> Result<Confirmation, LedgerError> {
        loop {
            let receipt = bounded(
                self.settings.request_timeout,
                self.reader.get_transaction_receipt(pending.tx_hash),
            )
            .await?;

            if let Some(receipt) = receipt {
                if !receipt.status() {
                    return Err(LedgerError::Other(format!(
                        "transaction {} reverted",
                        pending.tx_hash
                    )));
                }

                if let Some(block_number) = receipt.block_number {
                    let head = bounded(
                        self.settings.request_timeout,
                        self.reader.get_block_number(),
                    )
                    .await?;

                    if head.saturating_sub(block_number) + 1 >= required {
                        return Ok(Confirmation {
                            tx_hash: pending.tx_hash,
                            block_number,
                        });
                    }
                }
            }

            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }
}

#[async_trait]
impl Ledger for EvmLedger {
    async fn get_balance(&self, address: Address) -> Result<U256, LedgerError> {
        bounded(
            self.settings.request_timeout,
            self.reader.get_balance(address),
        )
        .await
    }

    async fn send_value(&self, to: Address, amount: U256) -> Result<PendingTransfer, LedgerError> {
        let provider = self
            .signer
            .as_ref()
            .ok_or_else(|| LedgerError::Other("ledger has no signing wallet".to_string()))?;

        let tx = TransactionRequest::default().to(to).value(amount);
        let pending = bounded(self.settings.request_timeout, provider.send_transaction(tx)).await?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(
            chain_id = %self.network.chain_id,
            tx_hash = %tx_hash,
            to = %to,
            "Funding transfer submitted"
        );

        Ok(PendingTransfer { tx_hash })
    }

    async fn await_confirmation(
        &self,
        pending: &PendingTransfer,
        min_confirmations: u64,
    ) -> Result<Confirmation, LedgerError> {
        let required = min_confirmations.max(1);
        match tokio::time::timeout(
            self.settings.confirmation_timeout,
            self.poll_confirmation(pending, required),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(LedgerError::Timeout),
        }
    }
}

/// Run one RPC with a deadline and classify its failure.
async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, LedgerError>
where
    F: IntoFuture<Output = Result<T, TransportError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(LedgerError::from_transport),
        Err(_) => Err(LedgerError::Timeout),
    }
}

/// Errors at the ledger boundary.
///
/// Every RPC failure is mapped into one of these variants before it reaches
/// the funding engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Insufficient funds in custodial wallet")]
    InsufficientFunds,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Ledger request timed out")]
    Timeout,

    #[error("Ledger error: {0}")]
    Other(String),
}

impl LedgerError {
    /// Classify an alloy transport error.
    pub fn from_transport(err: TransportError) -> Self {
        match &err {
            RpcError::ErrorResp(payload) if is_insufficient_funds(&payload.message) => {
                LedgerError::InsufficientFunds
            }
            RpcError::Transport(_) => LedgerError::Network(err.to_string()),
            _ => LedgerError::Other(err.to_string()),
        }
    }

    /// Whether the failure came from the transport rather than the ledger itself.
    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::Network(_) | LedgerError::Timeout)
    }
}

fn is_insufficient_funds(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("insufficient funds") || message.contains("insufficient balance")
}
