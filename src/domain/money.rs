//! Exact monetary values.
//!
//! All amounts are `rust_decimal::Decimal` — fixed-point, no floating-point
//! accumulation. Unit costs (amount per share) are rounded half-even at
//! [`UNIT_COST_DP`] fractional digits, applied identically wherever a unit
//! cost is derived, so FIFO and moving-average results reproduce bit-for-bit
//! from the same input sequence.

use crate::error::EngineError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fractional digits kept when deriving a per-share unit cost.
pub const UNIT_COST_DP: u32 = 8;

/// Round a derived unit cost half-even at [`UNIT_COST_DP`] digits.
pub fn round_unit_cost(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(UNIT_COST_DP, RoundingStrategy::MidpointNearestEven)
}

/// ISO-style currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency(pub String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An exact amount in one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub currency: Currency,
    pub amount: Decimal,
}

impl Money {
    pub fn new(currency: Currency, amount: Decimal) -> Self {
        Self { currency, amount }
    }

    pub fn zero(currency: Currency) -> Self {
        Self { currency, amount: Decimal::ZERO }
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Checked addition. Mixing currencies is never coerced silently.
    pub fn try_add(&self, other: &Money) -> Result<Money, EngineError> {
        if self.currency != other.currency {
            return Err(EngineError::InconsistentCurrency {
                expected: self.currency.clone(),
                found: other.currency.clone(),
            });
        }
        Ok(Money::new(self.currency.clone(), self.amount + other.amount))
    }

    pub fn try_sub(&self, other: &Money) -> Result<Money, EngineError> {
        if self.currency != other.currency {
            return Err(EngineError::InconsistentCurrency {
                expected: self.currency.clone(),
                found: other.currency.clone(),
            });
        }
        Ok(Money::new(self.currency.clone(), self.amount - other.amount))
    }

    /// Per-share unit cost of this amount spread over `shares`, rounded
    /// half-even at [`UNIT_COST_DP`] digits. `shares` must be non-zero.
    pub fn unit_cost(&self, shares: Decimal) -> Decimal {
        round_unit_cost(self.amount / shares)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eur(amount: Decimal) -> Money {
        Money::new(Currency::new("EUR"), amount)
    }

    #[test]
    fn add_same_currency() {
        let sum = eur(dec!(10.50)).try_add(&eur(dec!(4.25))).unwrap();
        assert_eq!(sum.amount, dec!(14.75));
    }

    #[test]
    fn add_mixed_currency_is_rejected() {
        let usd = Money::new(Currency::new("USD"), dec!(1));
        let err = eur(dec!(1)).try_add(&usd).unwrap_err();
        assert!(matches!(err, EngineError::InconsistentCurrency { .. }));
    }

    #[test]
    fn unit_cost_rounds_half_even() {
        // 1 / 3 = 0.333... → 8 digits
        assert_eq!(eur(dec!(1)).unit_cost(dec!(3)), dec!(0.33333333));
        // exact midpoint at the 9th digit rounds to the even neighbour
        assert_eq!(round_unit_cost(dec!(0.000000125)), dec!(0.00000012));
        assert_eq!(round_unit_cost(dec!(0.000000135)), dec!(0.00000014));
    }

    #[test]
    fn negative_detection() {
        assert!(eur(dec!(-0.01)).is_negative());
        assert!(!eur(Decimal::ZERO).is_negative());
    }
}
