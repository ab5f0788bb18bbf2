// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer handles and native amount conversion.

use alloy::primitives::{TxHash, U256};

/// Decimals of the native currency on every supported network.
pub const NATIVE_DECIMALS: u8 = 18;

/// A submitted transfer that has not been confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransfer {
    /// Transaction hash
    pub tx_hash: TxHash,
}

/// A transfer that reached the requested confirmation depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where the transaction was included
    pub block_number: u64,
}

/// Parse a human-readable amount to wei (or token units).
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "0.0025")
/// * `decimals` - Number of decimals (18 for native currency)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = amount.trim();
    let parts: Vec<&str> = amount.split('.').collect();

    if parts.len() > 2 || parts[0].is_empty() && parts.get(1).map_or(true, |p| p.is_empty()) {
        return Err(AmountError::Format(amount.to_string()));
    }

    let whole = if parts[0].is_empty() {
        0u128
    } else {
        parts[0]
            .parse::<u128>()
            .map_err(|_| AmountError::Format(amount.to_string()))?
    };

    let decimal_part = if parts.len() == 2 && !parts[1].is_empty() {
        let dec_str = parts[1];
        if dec_str.len() > decimals as usize {
            return Err(AmountError::TooPrecise { max: decimals });
        }
        if !dec_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Format(amount.to_string()));
        }
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
        padded
            .parse::<u128>()
            .map_err(|_| AmountError::Format(amount.to_string()))?
    } else {
        0u128
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or(AmountError::Overflow)?;

    Ok(U256::from(total))
}

/// Format wei (or token units) to human-readable amount.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}

/// Format a native balance (18 decimals).
pub fn format_native(amount: U256) -> String {
    format_amount(amount, NATIVE_DECIMALS)
}

/// Errors from amount parsing.
#[derive(Debug, thiserror::Error)]
pub enum AmountError {
    #[error("Invalid amount format: {0:?}")]
    Format(String),

    #[error("Too many decimal places (max {max})")]
    TooPrecise { max: u8 },

    #[error("Amount overflow")]
    Overflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_whole() {
        let result = parse_amount("1", 18).unwrap();
        assert_eq!(result, U256::from(1_000_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_amount_small() {
        let result = parse_amount("0.0025", 18).unwrap();
        assert_eq!(result, U256::from(2_500_000_000_000_000u64));

        let bare = parse_amount(".5", 18).unwrap();
        assert_eq!(bare, U256::from(500_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(parse_amount("1.2.3", 18), Err(AmountError::Format(_))));
        assert!(matches!(parse_amount("abc", 18), Err(AmountError::Format(_))));
        assert!(matches!(parse_amount(".", 18), Err(AmountError::Format(_))));
        assert!(matches!(parse_amount("0.1x", 18), Err(AmountError::Format(_))));
        assert!(matches!(
            parse_amount("0.1234567", 6),
            Err(AmountError::TooPrecise { max: 6 })
        ));
    }

    #[test]
    fn test_format_amount() {
        let one = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_amount(one, 18), "1");

        let funding = U256::from(2_500_000_000_000_000u64);
        assert_eq!(format_native(funding), "0.0025");

        assert_eq!(format_native(U256::ZERO), "0");
        assert_eq!(format_native(U256::from(1u8)), "0.000000000000000001");
    }
}
