// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Supported networks and the registry that resolves them by chain id.

use std::collections::BTreeMap;

use alloy::primitives::U256;
use url::Url;

use super::transactions::{parse_amount, NATIVE_DECIMALS};

/// Static definition of a supported network.
#[derive(Debug, Clone, Copy)]
pub struct NetworkDefinition {
    /// Chain identifier as exposed over the API
    pub chain_id: &'static str,
    /// Network name for display
    pub name: &'static str,
    /// Native currency symbol
    pub symbol: &'static str,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
    /// Amount of native currency sent per funding, in whole units
    pub funding_amount: &'static str,
}

/// BNB Smart Chain testnet.
pub const BSC_TESTNET: NetworkDefinition = NetworkDefinition {
    chain_id: "97",
    name: "BNB Smart Chain Testnet",
    symbol: "tBNB",
    rpc_url: "https://data-seed-prebsc-1-s1.bnbchain.org:8545",
    explorer_url: "https://testnet.bscscan.com",
    funding_amount: "0.0025",
};

/// Ethereum Sepolia testnet.
pub const ETH_SEPOLIA: NetworkDefinition = NetworkDefinition {
    chain_id: "11155111",
    name: "Ethereum Sepolia",
    symbol: "ETH",
    rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
    explorer_url: "https://sepolia.etherscan.io",
    funding_amount: "0.001",
};

/// Avalanche Fuji testnet.
pub const AVAX_FUJI: NetworkDefinition = NetworkDefinition {
    chain_id: "43113",
    name: "Avalanche Fuji Testnet",
    symbol: "AVAX",
    rpc_url: "https://api.avax-test.network/ext/bc/C/rpc",
    explorer_url: "https://testnet.snowtrace.io",
    funding_amount: "0.01",
};

/// Polygon Amoy testnet.
pub const POLYGON_AMOY: NetworkDefinition = NetworkDefinition {
    chain_id: "80002",
    name: "Polygon Amoy",
    symbol: "POL",
    rpc_url: "https://rpc-amoy.polygon.technology",
    explorer_url: "https://amoy.polygonscan.com",
    funding_amount: "0.01",
};

/// Networks compiled into this build.
pub const SUPPORTED_NETWORKS: [NetworkDefinition; 4] =
    [BSC_TESTNET, ETH_SEPOLIA, AVAX_FUJI, POLYGON_AMOY];

/// Resolved network configuration, immutable after startup.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Chain identifier
    pub chain_id: String,
    /// Network name for display
    pub name: String,
    /// Native currency symbol
    pub symbol: String,
    /// RPC endpoint
    pub rpc_url: Url,
    /// Block explorer URL
    pub explorer_url: String,
    /// Funding amount as configured (whole units, decimal string)
    pub funding_amount: String,
    /// Funding amount in wei
    pub funding_amount_wei: U256,
}

impl NetworkConfig {
    /// Build a config from a static definition, optionally overriding the RPC endpoint.
    pub fn from_definition(
        definition: &NetworkDefinition,
        rpc_override: Option<&str>,
    ) -> Result<Self, RegistryError> {
        let raw_url = rpc_override.unwrap_or(definition.rpc_url);
        let rpc_url = Url::parse(raw_url).map_err(|e| RegistryError::InvalidRpcUrl {
            chain_id: definition.chain_id.to_string(),
            reason: e.to_string(),
        })?;

        let funding_amount_wei =
            parse_amount(definition.funding_amount, NATIVE_DECIMALS).map_err(|e| {
                RegistryError::InvalidFundingAmount {
                    chain_id: definition.chain_id.to_string(),
                    reason: e.to_string(),
                }
            })?;
        if funding_amount_wei.is_zero() {
            return Err(RegistryError::InvalidFundingAmount {
                chain_id: definition.chain_id.to_string(),
                reason: "funding amount must be positive".to_string(),
            });
        }

        Ok(Self {
            chain_id: definition.chain_id.to_string(),
            name: definition.name.to_string(),
            symbol: definition.symbol.to_string(),
            rpc_url,
            explorer_url: definition.explorer_url.to_string(),
            funding_amount: definition.funding_amount.to_string(),
            funding_amount_wei,
        })
    }

    /// Whether `balance` is at least half the funding amount.
    ///
    /// An address that spent some gas since its last funding is therefore not
    /// topped up again on every poll. Compared as `2 * balance >= amount` so odd
    /// amounts are not rounded in the target's favour.
    pub fn counts_as_funded(&self, balance: U256) -> bool {
        balance.saturating_mul(U256::from(2u8)) >= self.funding_amount_wei
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, tx_hash)
    }
}

/// Read-only lookup of supported networks keyed by chain id.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: BTreeMap<String, NetworkConfig>,
}

impl NetworkRegistry {
    /// Create a registry, rejecting duplicate chain ids.
    pub fn new(networks: Vec<NetworkConfig>) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();
        for network in networks {
            let chain_id = network.chain_id.clone();
            if map.insert(chain_id.clone(), network).is_some() {
                return Err(RegistryError::DuplicateChain(chain_id));
            }
        }
        Ok(Self { networks: map })
    }

    /// Registry of the built-in networks with their default endpoints.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::with_rpc_overrides(|_| None)
    }

    /// Registry of the built-in networks, asking `rpc_for` for endpoint overrides.
    pub fn with_rpc_overrides<F>(rpc_for: F) -> Result<Self, RegistryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let networks = SUPPORTED_NETWORKS
            .iter()
            .map(|definition| {
                let url = rpc_for(definition.chain_id);
                NetworkConfig::from_definition(definition, url.as_deref())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(networks)
    }

    /// Resolve a chain id.
    pub fn lookup(&self, chain_id: &str) -> Result<&NetworkConfig, RegistryError> {
        let key = chain_id.trim();
        self.networks
            .get(key)
            .ok_or_else(|| RegistryError::UnsupportedChain(key.to_string()))
    }

    /// All networks in chain id order.
    pub fn iter(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.networks.values()
    }
}

/// Errors raised while building or querying the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Duplicate chain id: {0}")]
    DuplicateChain(String),

    #[error("Invalid RPC URL for chain {chain_id}: {reason}")]
    InvalidRpcUrl { chain_id: String, reason: String },

    #[error("Invalid funding amount for chain {chain_id}: {reason}")]
    InvalidFundingAmount { chain_id: String, reason: String },
}
