// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Funding Decision Engine
//!
//! Decides whether a target address needs funding and, if so, sends the
//! configured amount from the custodial wallet.
//!
//! ## Pipeline
//!
//! 1. Validate the target address.
//! 2. Resolve the network.
//! 3. Require a configured custodial wallet.
//! 4. Refuse when the custodian holds less than the funding amount.
//! 5. Short-circuit with `AlreadyFunded` when the target holds at least half
//!    the funding amount. No transfer is submitted in that case.
//! 6. Submit the transfer and wait for one confirmation.
//! 7. Publish `addressFunded` to connected observers.
//!
//! Nothing guards steps 5 and 6 across concurrent calls: two simultaneous
//! requests for the same empty address can both pass step 5 and both send.

use std::sync::Arc;

use alloy::primitives::Address;
use serde::Serialize;
use tracing::{info, warn};

use super::outcome::{FundingOutcome, FundingRequest, RejectReason};
use crate::blockchain::{
    format_native, CustodialWallet, LedgerConnector, NetworkConfig, NetworkRegistry,
};
use crate::events::{AddressFunded, Event, EventNotifier};

/// Confirmation depth required before a transfer is reported as funded.
pub const REQUIRED_CONFIRMATIONS: u64 = 1;

/// Native balance of an address on one network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceReport {
    /// Checksummed address
    pub address: String,
    pub chain_id: String,
    /// Network display name
    pub network: String,
    /// Balance in whole native units
    pub balance: String,
    /// Balance in wei
    pub balance_wei: String,
    pub symbol: String,
}

/// Funding orchestration over the registry, the custodial wallet and a ledger connector.
pub struct FundingEngine {
    registry: Arc<NetworkRegistry>,
    wallet: Option<Arc<CustodialWallet>>,
    connector: Arc<dyn LedgerConnector>,
    notifier: EventNotifier,
}

impl FundingEngine {
    pub fn new(
        registry: Arc<NetworkRegistry>,
        wallet: Option<Arc<CustodialWallet>>,
        connector: Arc<dyn LedgerConnector>,
        notifier: EventNotifier,
    ) -> Self {
        Self {
            registry,
            wallet,
            connector,
            notifier,
        }
    }

    /// Whether a custodial secret was configured.
    pub fn is_configured(&self) -> bool {
        self.wallet.is_some()
    }

    /// Run the funding pipeline. Every failure is folded into `Rejected`.
    pub async fn fund(&self, request: &FundingRequest) -> FundingOutcome {
        match self.try_fund(request).await {
            Ok(outcome) => outcome,
            Err(reason) => {
                warn!(
                    address = %request.target_address,
                    chain_id = %request.chain_id,
                    reason = %reason,
                    details = ?reason.details(),
                    "Funding request rejected"
                );
                FundingOutcome::Rejected { reason }
            }
        }
    }

    async fn try_fund(&self, request: &FundingRequest) -> Result<FundingOutcome, RejectReason> {
        let target = parse_address(&request.target_address)?;
        let network = self.resolve(&request.chain_id)?;
        let wallet = self.wallet.as_deref().ok_or(RejectReason::NotConfigured)?;

        let ledger = self
            .connector
            .connect(network, Some(wallet))
            .await
            .map_err(RejectReason::from_funding_error)?;

        let amount = network.funding_amount_wei;
        let funder_balance = ledger
            .get_balance(wallet.address())
            .await
            .map_err(RejectReason::from_funding_error)?;
        if funder_balance < amount {
            return Err(RejectReason::FunderUnderfunded(format!(
                "custodial wallet holds {} {}, funding requires {}",
                format_native(funder_balance),
                network.symbol,
                network.funding_amount
            )));
        }

        let target_balance = ledger
            .get_balance(target)
            .await
            .map_err(RejectReason::from_funding_error)?;
        if network.counts_as_funded(target_balance) {
            info!(
                address = %target,
                chain_id = %network.chain_id,
                balance = %format_native(target_balance),
                "Target already funded, skipping transfer"
            );
            return Ok(FundingOutcome::AlreadyFunded {
                observed_balance: format_native(target_balance),
            });
        }

        let pending = ledger
            .send_value(target, amount)
            .await
            .map_err(RejectReason::from_funding_error)?;

        let confirmation = ledger
            .await_confirmation(&pending, REQUIRED_CONFIRMATIONS)
            .await
            .map_err(|e| {
                RejectReason::FundingFailed(format!(
                    "transfer {} submitted but not confirmed: {e}",
                    pending.tx_hash
                ))
            })?;

        let tx_hash = confirmation.tx_hash.to_string();
        let amount_sent = format_native(amount);

        info!(
            address = %target,
            chain_id = %network.chain_id,
            tx_hash = %tx_hash,
            block_number = confirmation.block_number,
            amount = %amount_sent,
            explorer = %network.tx_url(&tx_hash),
            "Address funded"
        );

        let delivered = self
            .notifier
            .publish(&Event::AddressFunded(AddressFunded {
                address: target.to_checksum(None),
                chain_id: network.chain_id.clone(),
                amount: amount_sent.clone(),
                tx_hash: tx_hash.clone(),
                block_number: confirmation.block_number,
            }))
            .await;
        tracing::debug!(observers = delivered, "addressFunded published");

        Ok(FundingOutcome::Funded {
            transaction_hash: tx_hash,
            confirming_block: confirmation.block_number,
            amount_sent,
        })
    }

    /// Native balance of `address` on `chain_id`. Never needs the custodial wallet.
    pub async fn check_balance(
        &self,
        address: &str,
        chain_id: &str,
    ) -> Result<BalanceReport, RejectReason> {
        let address = parse_address(address)?;
        let network = self.resolve(chain_id)?;

        let ledger = self
            .connector
            .connect(network, None)
            .await
            .map_err(|e| RejectReason::BalanceUnavailable(e.to_string()))?;
        let balance = ledger
            .get_balance(address)
            .await
            .map_err(|e| RejectReason::BalanceUnavailable(e.to_string()))?;

        Ok(BalanceReport {
            address: address.to_checksum(None),
            chain_id: network.chain_id.clone(),
            network: network.name.clone(),
            balance: format_native(balance),
            balance_wei: balance.to_string(),
            symbol: network.symbol.clone(),
        })
    }

    /// Resolve a chain id through the registry.
    pub fn resolve(&self, chain_id: &str) -> Result<&NetworkConfig, RejectReason> {
        self.registry
            .lookup(chain_id)
            .map_err(|_| RejectReason::UnsupportedChain(chain_id.trim().to_string()))
    }
}

/// Parse an EVM address.
///
/// Requires the `0x` prefix and 40 hex digits. All-lowercase and all-uppercase
/// forms are accepted as-is; mixed case must carry a valid EIP-55 checksum.
pub fn parse_address(raw: &str) -> Result<Address, RejectReason> {
    let trimmed = raw.trim();
    let invalid = || RejectReason::InvalidAddress(trimmed.to_string());

    let digits = trimmed.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(trimmed, None).map_err(|_| invalid())
    } else {
        trimmed.parse::<Address>().map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::mock::{test_wallet, MockLedgerConnector, FIRST_CONFIRMING_BLOCK};
    use crate::blockchain::LedgerError;
    use alloy::primitives::U256;

    const TARGET: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";

    fn wei(amount: &str) -> U256 {
        crate::blockchain::parse_amount(amount, 18).unwrap()
    }

    fn target() -> Address {
        TARGET.parse().unwrap()
    }

    fn engine_with(
        connector: &Arc<MockLedgerConnector>,
        configured: bool,
    ) -> (FundingEngine, EventNotifier) {
        let notifier = EventNotifier::new();
        let engine = FundingEngine::new(
            Arc::new(NetworkRegistry::builtin().unwrap()),
            configured.then(|| Arc::new(test_wallet())),
            connector.clone(),
            notifier.clone(),
        );
        (engine, notifier)
    }

    fn funded_custodian(connector: &MockLedgerConnector, chain_id: &str) {
        connector.set_balance(chain_id, test_wallet().address(), wei("1.0"));
    }

    #[tokio::test]
    async fn funds_empty_target_on_bsc_testnet() {
        let connector = Arc::new(MockLedgerConnector::new());
        funded_custodian(&connector, "97");
        let (engine, notifier) = engine_with(&connector, true);
        let mut observer = notifier.subscribe().await;

        let outcome = engine.fund(&FundingRequest::new(TARGET, "97")).await;

        let sends = connector.sends();
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].to, target());
        assert_eq!(sends[0].amount, wei("0.0025"));

        match outcome {
            FundingOutcome::Funded {
                transaction_hash,
                confirming_block,
                amount_sent,
            } => {
                assert_eq!(transaction_hash, sends[0].tx_hash.to_string());
                assert_eq!(confirming_block, FIRST_CONFIRMING_BLOCK);
                assert_eq!(amount_sent, "0.0025");
            }
            other => panic!("expected Funded, got {other:?}"),
        }

        let message = observer.receiver.recv().await.expect("event delivered");
        let event: serde_json::Value = serde_json::from_str(&message).unwrap();
        assert_eq!(event["type"], "addressFunded");
        assert_eq!(event["data"]["address"], TARGET);
        assert_eq!(event["data"]["chainId"], "97");
        assert_eq!(event["data"]["amount"], "0.0025");
        assert_eq!(event["data"]["txHash"], sends[0].tx_hash.to_string());
        assert_eq!(event["data"]["blockNumber"], FIRST_CONFIRMING_BLOCK);
        assert!(observer.receiver.try_recv().is_err());

        assert_eq!(connector.confirmation_depths(), vec![1]);
    }

    #[tokio::test]
    async fn repeated_calls_do_not_refund() {
        let connector = Arc::new(MockLedgerConnector::new());
        funded_custodian(&connector, "97");
        let (engine, _) = engine_with(&connector, true);
        let request = FundingRequest::new(TARGET, "97");

        let first = engine.fund(&request).await;
        assert!(matches!(first, FundingOutcome::Funded { .. }));

        for _ in 0..3 {
            let again = engine.fund(&request).await;
            assert_eq!(
                again,
                FundingOutcome::AlreadyFunded {
                    observed_balance: "0.0025".to_string()
                }
            );
        }
        assert_eq!(connector.sends().len(), 1);
    }

    #[tokio::test]
    async fn exactly_half_is_already_funded() {
        let connector = Arc::new(MockLedgerConnector::new());
        funded_custodian(&connector, "97");
        connector.set_balance("97", target(), wei("0.00125"));
        let (engine, _) = engine_with(&connector, true);

        let outcome = engine.fund(&FundingRequest::new(TARGET, "97")).await;
        assert_eq!(
            outcome,
            FundingOutcome::AlreadyFunded {
                observed_balance: "0.00125".to_string()
            }
        );
        assert!(connector.sends().is_empty());
    }

    #[tokio::test]
    async fn one_wei_below_half_is_funded() {
        let connector = Arc::new(MockLedgerConnector::new());
        funded_custodian(&connector, "97");
        connector.set_balance("97", target(), wei("0.00125") - U256::from(1u8));
        let (engine, _) = engine_with(&connector, true);

        let outcome = engine.fund(&FundingRequest::new(TARGET, "97")).await;
        assert!(matches!(outcome, FundingOutcome::Funded { .. }));
        assert_eq!(connector.sends().len(), 1);
    }

    #[tokio::test]
    async fn underfunded_custodian_never_sends() {
        let connector = Arc::new(MockLedgerConnector::new());
        connector.set_balance("97", test_wallet().address(), wei("0.002"));
        let (engine, _) = engine_with(&connector, true);

        let outcome = engine.fund(&FundingRequest::new(TARGET, "97")).await;
        match outcome {
            FundingOutcome::Rejected {
                reason: RejectReason::FunderUnderfunded(detail),
            } => assert!(detail.contains("0.002")),
            other => panic!("expected underfunded rejection, got {other:?}"),
        }
        assert!(connector.sends().is_empty());
        // Only the custodian balance is read; the target is never queried.
        assert_eq!(connector.balance_queries(), 1);
    }

    #[tokio::test]
    async fn underfunded_custodian_wins_over_funded_target() {
        let connector = Arc::new(MockLedgerConnector::new());
        connector.set_balance("97", target(), wei("5"));
        let (engine, _) = engine_with(&connector, true);

        let outcome = engine.fund(&FundingRequest::new(TARGET, "97")).await;
        assert!(matches!(
            outcome,
            FundingOutcome::Rejected {
                reason: RejectReason::FunderUnderfunded(_)
            }
        ));
    }

    #[tokio::test]
    async fn unconfigured_service_contacts_no_ledger() {
        let connector = Arc::new(MockLedgerConnector::new());
        let (engine, _) = engine_with(&connector, false);

        let outcome = engine.fund(&FundingRequest::new(TARGET, "97")).await;
        assert_eq!(
            outcome,
            FundingOutcome::Rejected {
                reason: RejectReason::NotConfigured
            }
        );
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn unsupported_chain_contacts_no_ledger() {
        let connector = Arc::new(MockLedgerConnector::new());
        let (engine, _) = engine_with(&connector, true);

        let outcome = engine.fund(&FundingRequest::new(TARGET, "1")).await;
        assert_eq!(
            outcome,
            FundingOutcome::Rejected {
                reason: RejectReason::UnsupportedChain("1".to_string())
            }
        );

        let balance = engine.check_balance(TARGET, "999").await;
        assert!(matches!(balance, Err(RejectReason::UnsupportedChain(_))));
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn invalid_address_is_rejected_first() {
        let connector = Arc::new(MockLedgerConnector::new());
        let (engine, _) = engine_with(&connector, false);

        let outcome = engine.fund(&FundingRequest::new("0x1234", "1")).await;
        assert!(matches!(
            outcome,
            FundingOutcome::Rejected {
                reason: RejectReason::InvalidAddress(_)
            }
        ));
        assert_eq!(connector.connect_count(), 0);
    }

    #[tokio::test]
    async fn ledger_outage_is_funding_failed() {
        let connector = Arc::new(MockLedgerConnector::new());
        connector.fail_balances("97", LedgerError::Network("connection refused".into()));
        let (engine, _) = engine_with(&connector, true);

        let outcome = engine.fund(&FundingRequest::new(TARGET, "97")).await;
        match outcome {
            FundingOutcome::Rejected {
                reason: RejectReason::FundingFailed(detail),
            } => assert!(detail.contains("connection refused")),
            other => panic!("expected funding failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn insufficient_funds_on_send_is_underfunded() {
        let connector = Arc::new(MockLedgerConnector::new());
        funded_custodian(&connector, "97");
        connector.fail_sends(LedgerError::InsufficientFunds);
        let (engine, _) = engine_with(&connector, true);

        let outcome = engine.fund(&FundingRequest::new(TARGET, "97")).await;
        assert!(matches!(
            outcome,
            FundingOutcome::Rejected {
                reason: RejectReason::FunderUnderfunded(_)
            }
        ));
    }

    #[tokio::test]
    async fn confirmation_timeout_reports_submitted_hash_and_publishes_nothing() {
        let connector = Arc::new(MockLedgerConnector::new());
        funded_custodian(&connector, "97");
        connector.fail_confirmations(LedgerError::Timeout);
        let (engine, notifier) = engine_with(&connector, true);
        let mut observer = notifier.subscribe().await;

        let outcome = engine.fund(&FundingRequest::new(TARGET, "97")).await;
        let sent = connector.sends();
        assert_eq!(sent.len(), 1);
        match outcome {
            FundingOutcome::Rejected {
                reason: RejectReason::FundingFailed(detail),
            } => assert!(detail.contains(&sent[0].tx_hash.to_string())),
            other => panic!("expected funding failure, got {other:?}"),
        }
        assert!(observer.receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn check_balance_reports_formatted_amount() {
        let connector = Arc::new(MockLedgerConnector::new());
        connector.set_balance("43113", target(), wei("1.5"));
        let (engine, _) = engine_with(&connector, false);

        let report = engine
            .check_balance(&TARGET.to_lowercase(), "43113")
            .await
            .unwrap();
        assert_eq!(report.address, TARGET);
        assert_eq!(report.balance, "1.5");
        assert_eq!(report.network, "Avalanche Fuji Testnet");
        assert_eq!(report.symbol, "AVAX");
    }

    #[tokio::test]
    async fn check_balance_surfaces_ledger_failure() {
        let connector = Arc::new(MockLedgerConnector::new());
        connector.fail_balances("43113", LedgerError::Timeout);
        let (engine, _) = engine_with(&connector, false);

        let result = engine.check_balance(TARGET, "43113").await;
        assert!(matches!(result, Err(RejectReason::BalanceUnavailable(_))));
    }

    #[test]
    fn parse_address_accepts_lowercase_and_valid_checksum() {
        assert!(parse_address(TARGET).is_ok());
        assert!(parse_address(&TARGET.to_lowercase()).is_ok());
        assert!(parse_address(&format!(" {TARGET} ")).is_ok());
    }

    #[test]
    fn parse_address_rejects_bad_checksum_and_shape() {
        // Flip the case of one checksummed letter.
        let bad_checksum = TARGET.replacen("Cc", "cc", 1);
        assert!(parse_address(&bad_checksum).is_err());
        assert!(parse_address("742d35Cc6634C0532925a3b844Bc454e4438f44e").is_err());
        assert!(parse_address("0x742d35").is_err());
        assert!(parse_address("0xZZ2d35Cc6634C0532925a3b844Bc454e4438f44e").is_err());
        assert!(parse_address("").is_err());
    }
}
