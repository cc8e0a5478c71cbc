//! Numeric normalizer: canonical quantity and monetary semantics.
//!
//! Monetary amounts are whole currency units stored as `i64` (the observed
//! locale rounds currency to zero fractional digits). Every rounding decision
//! lives here so the rest of the engine never touches floating point.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A monetary amount in whole currency units.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    pub const fn units(self) -> i64 {
        self.0
    }

    /// Canonicalize a raw decimal value to whole currency units,
    /// rounding half away from zero.
    pub fn round(value: f64) -> Self {
        Self(value.round() as i64)
    }

    /// Line total: `quantity * unit_cost`, accumulated in `i128` to avoid
    /// intermediate overflow, then checked back into `i64`.
    pub fn times(self, quantity: i64) -> DomainResult<Self> {
        let wide = (self.0 as i128) * (quantity as i128);
        i64::try_from(wide)
            .map(Self)
            .map_err(|_| DomainError::validation("amount overflow"))
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl core::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl core::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        Amount(iter.map(|a| a.0).sum())
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A percentage with two decimal places of precision, stored as basis points
/// (`12.5%` == `1250`). Integer representation keeps commission math
/// deterministic.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(i64);

impl Percentage {
    /// From whole percent (e.g. `10` for 10%).
    pub const fn percent(value: i64) -> Self {
        Self(value * 100)
    }

    /// From basis points (e.g. `1250` for 12.5%).
    pub const fn from_basis_points(bp: i64) -> Self {
        Self(bp)
    }

    pub const fn basis_points(self) -> i64 {
        self.0
    }

    /// Apply to a base amount: `base * pct / 100`, rounded half away from
    /// zero in whole currency units.
    pub fn apply(self, base: Amount) -> Amount {
        let numer = (base.units() as i128) * (self.0 as i128);
        // 100 (percent) * 100 (basis points) = 10_000.
        let denom: i128 = 10_000;
        let quot = numer / denom;
        let rem = numer % denom;
        let rounded = if rem.abs() * 2 >= denom {
            quot + numer.signum()
        } else {
            quot
        };
        Amount::new(rounded as i64)
    }
}

/// Validate a finalized item quantity (strictly positive).
pub fn validate_quantity(quantity: i64) -> DomainResult<()> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    Ok(())
}

/// Validate a unit cost (non-negative).
pub fn validate_unit_cost(unit_cost: Amount) -> DomainResult<()> {
    if unit_cost.is_negative() {
        return Err(DomainError::validation("unit_cost cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_is_half_away_from_zero() {
        assert_eq!(Amount::round(10.4), Amount::new(10));
        assert_eq!(Amount::round(10.5), Amount::new(11));
        assert_eq!(Amount::round(-10.5), Amount::new(-11));
        assert_eq!(Amount::round(0.0), Amount::ZERO);
    }

    #[test]
    fn times_accumulates_wide() {
        let unit = Amount::new(1_000_000);
        assert_eq!(unit.times(3).unwrap(), Amount::new(3_000_000));
        assert!(Amount::new(i64::MAX).times(2).is_err());
    }

    #[test]
    fn percentage_apply_rounds_to_whole_units() {
        // 10% of 1005 = 100.5 -> 101
        assert_eq!(Percentage::percent(10).apply(Amount::new(1005)), Amount::new(101));
        // 12.5% of 1000 = 125
        assert_eq!(
            Percentage::from_basis_points(1250).apply(Amount::new(1000)),
            Amount::new(125)
        );
        // 12.5% of 999 = 124.875 -> 125
        assert_eq!(
            Percentage::from_basis_points(1250).apply(Amount::new(999)),
            Amount::new(125)
        );
        // 33.33% of 100 = 33.33 -> 33
        assert_eq!(
            Percentage::from_basis_points(3333).apply(Amount::new(100)),
            Amount::new(33)
        );
    }

    #[test]
    fn quantity_and_cost_validation() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_unit_cost(Amount::ZERO).is_ok());
        assert!(validate_unit_cost(Amount::new(-1)).is_err());
    }
}
