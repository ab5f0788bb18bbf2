// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custodial wallet used to sign every funding transfer.
//!
//! The process holds exactly one signing identity, derived from the secret in
//! `FUNDER_PRIVATE_KEY`. The same key signs on every supported network. The
//! secret may be given as hex (with or without `0x`) or as a PEM-encoded
//! secp256k1 key (PKCS#8 or SEC1).

use std::fmt;

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    signers::local::PrivateKeySigner,
};
use k256::SecretKey;

/// The backend-held signing identity.
///
/// Never serialized; `Debug` prints only the public address.
#[derive(Clone)]
pub struct CustodialWallet {
    signer: PrivateKeySigner,
}

impl CustodialWallet {
    /// Parse the configured secret.
    pub fn from_secret(secret: &str) -> Result<Self, SigningError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(SigningError::Empty);
        }

        let hex_key = if secret.starts_with("-----BEGIN") {
            pem_to_hex(secret.as_bytes())?
        } else {
            secret
                .strip_prefix("0x")
                .or_else(|| secret.strip_prefix("0X"))
                .unwrap_or(secret)
                .to_string()
        };

        Ok(Self {
            signer: create_signer(&hex_key)?,
        })
    }

    /// Public address of the custodial wallet.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Wallet for alloy's signing filler.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl fmt::Debug for CustodialWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustodialWallet")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Create a signer from a private key (hex string without 0x prefix).
fn create_signer(private_key_hex: &str) -> Result<PrivateKeySigner, SigningError> {
    let key_bytes = alloy::hex::decode(private_key_hex)
        .map_err(|_| SigningError::InvalidKey("not valid hex".to_string()))?;

    if key_bytes.len() != 32 {
        return Err(SigningError::InvalidKey(format!(
            "expected 32 bytes, got {}",
            key_bytes.len()
        )));
    }

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|_| SigningError::InvalidKey("not a valid secp256k1 scalar".to_string()))
}

/// Parse a private key from PEM format to hex string.
///
/// Accepts SEC1 (`EC PRIVATE KEY`) and PKCS#8 (`PRIVATE KEY`) encodings.
fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, SigningError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|_| SigningError::InvalidKey("PEM is not UTF-8".to_string()))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| SigningError::InvalidKey(format!("invalid PEM: {e}")))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| {
            use k256::pkcs8::DecodePrivateKey;
            SecretKey::from_pkcs8_der(pem.contents())
        })
        .map_err(|_| SigningError::InvalidKey("unsupported PEM key format".to_string()))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

/// Errors while loading the custodial wallet.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Custodial secret is empty")]
    Empty,

    #[error("Invalid custodial secret: {0}")]
    InvalidKey(String),
}
