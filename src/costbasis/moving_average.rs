//! Moving-average cost basis.
//!
//! One running state per trade, mutated by every flow: opening flows
//! re-blend the average unit cost, closing flows realize against it and
//! leave it unchanged. Quantities are unsigned magnitudes, as in the FIFO
//! queue.

use crate::domain::round_unit_cost;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Default)]
pub struct RunningAverage {
    shares: Decimal,
    average_unit_cost: Decimal,
}

impl RunningAverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blend an opening flow into the average:
    /// `(shares×avg + new×unit) / (shares+new)`, half-even at unit-cost
    /// scale.
    pub fn add(&mut self, shares: Decimal, unit_cost: Decimal) {
        let total = self.shares + shares;
        if total.is_zero() {
            return;
        }
        self.average_unit_cost = round_unit_cost(
            (self.shares * self.average_unit_cost + shares * unit_cost) / total,
        );
        self.shares = total;
    }

    /// Realize a closing flow: `shares × (close_unit − average)`. The
    /// average is unchanged by a disposal. Never realizes more shares than
    /// are held.
    pub fn realize(&mut self, shares: Decimal, close_unit: Decimal) -> Decimal {
        let consumed = shares.min(self.shares);
        self.shares -= consumed;
        consumed * (close_unit - self.average_unit_cost)
    }

    pub fn remaining_shares(&self) -> Decimal {
        self.shares
    }

    pub fn remaining_cost(&self) -> Decimal {
        round_unit_cost(self.shares * self.average_unit_cost)
    }

    pub fn average_unit_cost(&self) -> Decimal {
        self.average_unit_cost
    }
}
