// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Token amount conversion between human-readable strings and base units.

use alloy::primitives::U256;
use thiserror::Error;

/// Errors raised while converting token amounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount format: {0}")]
    Malformed(String),

    #[error("Too many decimal places (max {0})")]
    TooManyDecimals(u8),

    #[error("Amount overflow")]
    Overflow,
}

/// Parse a human-readable amount into base units.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (18 for AVAX, 6 for USDC)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Malformed("empty amount".to_string()));
    }

    let parts: Vec<&str> = trimmed.split('.').collect();
    if parts.len() > 2 || parts[0].is_empty() {
        return Err(AmountError::Malformed(trimmed.to_string()));
    }

    let whole = U256::from_str_radix(parts[0], 10)
        .map_err(|_| AmountError::Malformed(trimmed.to_string()))?;

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.len() > decimals as usize {
            return Err(AmountError::TooManyDecimals(decimals));
        }
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
        U256::from_str_radix(&padded, 10)
            .map_err(|_| AmountError::Malformed(trimmed.to_string()))?
    } else {
        U256::ZERO
    };

    let multiplier = U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .ok_or(AmountError::Overflow)?;

    whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or(AmountError::Overflow)
}

/// Format base units as a human-readable amount.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_whole() {
        let result = parse_amount("1", 18).unwrap();
        assert_eq!(result, U256::from(1_000_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_amount_decimal() {
        let result = parse_amount("1.5", 18).unwrap();
        assert_eq!(result, U256::from(1_500_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_amount_usdc() {
        // 1.5 USDC = 1_500_000 (6 decimals)
        let result = parse_amount("1.5", 6).unwrap();
        assert_eq!(result, U256::from(1_500_000u64));
    }

    #[test]
    fn test_parse_amount_small() {
        let result = parse_amount("0.001", 18).unwrap();
        assert_eq!(result, U256::from(1_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_amount_large_supply() {
        // Exceeds u128 in base units: one trillion tokens at 30 decimals
        let result = parse_amount("1000000000000", 30).unwrap();
        let expected = U256::from(10u64).pow(U256::from(42));
        assert_eq!(result, expected);
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(
            parse_amount("1.2.3", 18),
            Err(AmountError::Malformed(_))
        ));
        assert!(matches!(
            parse_amount("abc", 18),
            Err(AmountError::Malformed(_))
        ));
        assert!(matches!(
            parse_amount("", 18),
            Err(AmountError::Malformed(_))
        ));
        assert!(matches!(
            parse_amount("-1", 18),
            Err(AmountError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_amount_too_many_decimals() {
        assert_eq!(
            parse_amount("1.1234567", 6),
            Err(AmountError::TooManyDecimals(6))
        );
    }

    #[test]
    fn test_format_amount() {
        let one_avax = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_amount(one_avax, 18), "1");

        let one_and_half = U256::from(1_500_000_000_000_000_000u64);
        assert_eq!(format_amount(one_and_half, 18), "1.5");
    }

    #[test]
    fn test_format_amount_usdc() {
        let one_usdc = U256::from(1_000_000u64);
        assert_eq!(format_amount(one_usdc, 6), "1");

        let one_and_half = U256::from(1_500_000u64);
        assert_eq!(format_amount(one_and_half, 6), "1.5");
    }

    #[test]
    fn test_format_amount_zero() {
        assert_eq!(format_amount(U256::ZERO, 18), "0");
    }

    #[test]
    fn test_parse_format_inverse() {
        let parsed = parse_amount("12.75", 6).unwrap();
        assert_eq!(format_amount(parsed, 6), "12.75");
    }
}
