//! # Exponential Configuration
//!
//! Tuning knobs for the matrix exponential. Every setting trades speed or
//! output width only; results are enclosures for any configuration.
//! Deserializes with defaults for missing fields, so a partial YAML or
//! JSON document is a valid configuration.

use ballexp_core::bit_count;
use serde::{Deserialize, Serialize};

/// Default guard-bit multiplier: `wp = prec + 3·bitlen(prec)`.
pub const DEFAULT_GUARD_BITS_FACTOR: u64 = 3;

/// Largest guard-bit multiplier honoured by [`ExpConfig::working_precision`].
pub const MAX_GUARD_BITS_FACTOR: u64 = 64;

/// Settings for [`exp_with`](crate::exp_with).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpConfig {
    /// Guard bits per bit of `prec`'s bit length. Values above
    /// [`MAX_GUARD_BITS_FACTOR`] are treated as that maximum.
    pub guard_bits_factor: u64,
    /// Detect and restore exactly-known zero/one positions.
    pub detect_structure: bool,
    /// Exponentiate diagonal matrices entrywise.
    pub diagonal_fast_path: bool,
}

impl Default for ExpConfig {
    fn default() -> Self {
        Self {
            guard_bits_factor: DEFAULT_GUARD_BITS_FACTOR,
            detect_structure: true,
            diagonal_fast_path: true,
        }
    }
}

impl ExpConfig {
    /// Working precision for a target precision of `prec` bits.
    pub fn working_precision(&self, prec: u64) -> u64 {
        prec + self.guard_bits_factor.min(MAX_GUARD_BITS_FACTOR) * bit_count(prec)
    }

    /// `true` when every setting is within its honoured range.
    pub fn is_valid(&self) -> bool {
        self.guard_bits_factor <= MAX_GUARD_BITS_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_working_precision() {
        let c = ExpConfig::default();
        assert_eq!(c.working_precision(53), 53 + 3 * 6);
        assert_eq!(c.working_precision(64), 64 + 3 * 7);
        assert_eq!(c.working_precision(2), 2 + 3 * 2);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let c: ExpConfig = serde_json::from_str(r#"{"detect_structure": false}"#).unwrap();
        assert!(!c.detect_structure);
        assert!(c.diagonal_fast_path);
        assert_eq!(c.guard_bits_factor, DEFAULT_GUARD_BITS_FACTOR);
    }

    #[test]
    fn test_round_trips_through_json() {
        let c = ExpConfig {
            guard_bits_factor: 5,
            detect_structure: false,
            diagonal_fast_path: false,
        };
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(serde_json::from_str::<ExpConfig>(&json).unwrap(), c);
    }

    #[test]
    fn test_guard_bits_factor_cap() {
        let capped = ExpConfig {
            guard_bits_factor: 1000,
            ..ExpConfig::default()
        };
        assert!(!capped.is_valid());
        assert_eq!(capped.working_precision(64), 64 + MAX_GUARD_BITS_FACTOR * 7);
        assert!(ExpConfig::default().is_valid());
    }
}
