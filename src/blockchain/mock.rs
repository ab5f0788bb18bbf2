// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted in-memory ledger for tests.
//!
//! Balances and failures are set per chain id; every submitted transfer is
//! recorded and credited to the recipient so repeated funding attempts see
//! the new balance.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

use super::client::{Ledger, LedgerConnector, LedgerError};
use super::signing::CustodialWallet;
use super::transactions::{Confirmation, PendingTransfer};
use super::types::NetworkConfig;

/// Development key used as the custodial secret in tests (anvil account #0).
pub const TEST_FUNDER_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Block number reported for the first confirmed transfer.
pub const FIRST_CONFIRMING_BLOCK: u64 = 1_000;

pub fn test_wallet() -> CustodialWallet {
    CustodialWallet::from_secret(TEST_FUNDER_KEY).unwrap()
}

/// A transfer the engine submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSend {
    pub chain_id: String,
    pub to: Address,
    pub amount: U256,
    pub tx_hash: B256,
}

#[derive(Default)]
struct MockState {
    balances: Mutex<HashMap<(String, Address), U256>>,
    balance_failures: Mutex<HashMap<String, LedgerError>>,
    send_failure: Mutex<Option<LedgerError>>,
    confirm_failure: Mutex<Option<LedgerError>>,
    sends: Mutex<Vec<RecordedSend>>,
    confirmation_depths: Mutex<Vec<u64>>,
    connects: AtomicUsize,
    balance_queries: AtomicUsize,
    tx_counter: AtomicU64,
}

/// Connector handing out [`MockLedger`]s that share one scripted state.
#[derive(Default)]
pub struct MockLedgerConnector {
    state: Arc<MockState>,
}

impl MockLedgerConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balance(&self, chain_id: &str, address: Address, wei: U256) {
        self.state
            .balances
            .lock()
            .unwrap()
            .insert((chain_id.to_string(), address), wei);
    }

    pub fn fail_balances(&self, chain_id: &str, error: LedgerError) {
        self.state
            .balance_failures
            .lock()
            .unwrap()
            .insert(chain_id.to_string(), error);
    }

    pub fn fail_sends(&self, error: LedgerError) {
        *self.state.send_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_confirmations(&self, error: LedgerError) {
        *self.state.confirm_failure.lock().unwrap() = Some(error);
    }

    pub fn sends(&self) -> Vec<RecordedSend> {
        self.state.sends.lock().unwrap().clone()
    }

    /// `min_confirmations` of every confirmation wait, in call order.
    pub fn confirmation_depths(&self) -> Vec<u64> {
        self.state.confirmation_depths.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn balance_queries(&self) -> usize {
        self.state.balance_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerConnector for MockLedgerConnector {
    async fn connect(
        &self,
        network: &NetworkConfig,
        signer: Option<&CustodialWallet>,
    ) -> Result<Box<dyn Ledger>, LedgerError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockLedger {
            chain_id: network.chain_id.clone(),
            can_sign: signer.is_some(),
            state: Arc::clone(&self.state),
        }))
    }
}

/// Ledger view bound to one chain.
pub struct MockLedger {
    chain_id: String,
    can_sign: bool,
    state: Arc<MockState>,
}

#[async_trait]
impl Ledger for MockLedger {
    async fn get_balance(&self, address: Address) -> Result<U256, LedgerError> {
        self.state.balance_queries.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.state.balance_failures.lock().unwrap().get(&self.chain_id) {
            return Err(err.clone());
        }
        Ok(self
            .state
            .balances
            .lock()
            .unwrap()
            .get(&(self.chain_id.clone(), address))
            .copied()
            .unwrap_or(U256::ZERO))
    }

    async fn send_value(&self, to: Address, amount: U256) -> Result<PendingTransfer, LedgerError> {
        if !self.can_sign {
            return Err(LedgerError::Other("ledger has no signing wallet".to_string()));
        }
        if let Some(err) = self.state.send_failure.lock().unwrap().clone() {
            return Err(err);
        }

        let n = self.state.tx_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let tx_hash = B256::from(U256::from(n));

        self.state.sends.lock().unwrap().push(RecordedSend {
            chain_id: self.chain_id.clone(),
            to,
            amount,
            tx_hash,
        });

        let mut balances = self.state.balances.lock().unwrap();
        let balance = balances
            .entry((self.chain_id.clone(), to))
            .or_insert(U256::ZERO);
        *balance += amount;

        Ok(PendingTransfer { tx_hash })
    }

    async fn await_confirmation(
        &self,
        pending: &PendingTransfer,
        min_confirmations: u64,
    ) -> Result<Confirmation, LedgerError> {
        self.state
            .confirmation_depths
            .lock()
            .unwrap()
            .push(min_confirmations);
        if let Some(err) = self.state.confirm_failure.lock().unwrap().clone() {
            return Err(err);
        }
        let index = U256::from_be_bytes(pending.tx_hash.0);
        let offset: u64 = index.try_into().unwrap_or(0);
        Ok(Confirmation {
            tx_hash: pending.tx_hash,
            block_number: FIRST_CONFIRMING_BLOCK + offset - 1,
        })
    }
}
