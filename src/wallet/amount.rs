//! Conversion between display units and integer atoms.
//!
//! One display unit is 10^6 atoms. Converting a float truncates toward
//! zero, so precision beyond six decimals does not survive a round trip.

use crate::wallet::types::{WalletError, WalletResult};

/// Atoms per display unit.
pub const ATOMS_PER_UNIT: u64 = 1_000_000;

/// Convert a display amount into atoms, truncating sub-atom precision.
pub fn to_atoms(amount: f64) -> WalletResult<u64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(WalletError::InvalidAmount(format!(
            "{} is not a non-negative finite amount",
            amount
        )));
    }

    let scaled = (amount * ATOMS_PER_UNIT as f64).trunc();
    if scaled >= u64::MAX as f64 {
        return Err(WalletError::InvalidAmount(format!("{} overflows atom range", amount)));
    }

    Ok(scaled as u64)
}

/// Render atoms as a display amount with exactly six fractional digits.
pub fn from_atoms(atoms: u64) -> String {
    format!("{}.{:06}", atoms / ATOMS_PER_UNIT, atoms % ATOMS_PER_UNIT)
}

/// Parse a node-rendered amount such as `"1.5"` or `"1.5 OCT"` into atoms.
pub fn parse_display_amount(text: &str) -> WalletResult<u64> {
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| WalletError::InvalidAmount("empty amount".to_string()))?;

    let value: f64 = token
        .parse()
        .map_err(|_| WalletError::InvalidAmount(format!("'{}' is not a number", token)))?;

    to_atoms(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_atoms() {
        assert_eq!(to_atoms(1.25).unwrap(), 1_250_000);
        assert_eq!(to_atoms(0.0).unwrap(), 0);
        assert_eq!(to_atoms(0.000_001).unwrap(), 1);
        // Sub-atom precision is truncated
        assert_eq!(to_atoms(0.000_000_9).unwrap(), 0);
    }

    #[test]
    fn test_to_atoms_rejects_bad_input() {
        assert!(to_atoms(-1.0).is_err());
        assert!(to_atoms(f64::NAN).is_err());
        assert!(to_atoms(f64::INFINITY).is_err());
        assert!(to_atoms(1e20).is_err());
    }

    #[test]
    fn test_from_atoms() {
        assert_eq!(from_atoms(1_250_000), "1.250000");
        assert!(from_atoms(1_250_000).starts_with("1.25"));
        assert_eq!(from_atoms(1), "0.000001");
        assert_eq!(from_atoms(0), "0.000000");
    }

    #[test]
    fn test_atoms_survive_decimal_round_trip() {
        for atoms in [0u64, 1, 999_999, 1_000_000, 5_000_000, 123_456_789] {
            let text = from_atoms(atoms);
            assert_eq!(parse_display_amount(&text).unwrap(), atoms, "{}", text);
        }
    }

    #[test]
    fn test_parse_display_amount() {
        assert_eq!(parse_display_amount("1.5 OCT").unwrap(), 1_500_000);
        assert_eq!(parse_display_amount("  2 ").unwrap(), 2_000_000);
        assert!(parse_display_amount("").is_err());
        assert!(parse_display_amount("abc OCT").is_err());
    }
}
