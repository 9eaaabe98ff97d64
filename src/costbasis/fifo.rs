//! FIFO lot matching.
//!
//! Lots live in a `VecDeque`: opening flows push to the back, closing flows
//! trim a prefix off the front. Quantities here are unsigned magnitudes; the
//! trade direction applies its sign at the call site.

use crate::domain::round_unit_cost;
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// A discrete batch of shares acquired at one cost basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Lot {
    pub shares: Decimal,
    pub unit_cost: Decimal,
}

/// Queue of lots consumed in creation order.
#[derive(Debug, Clone, Default)]
pub struct LotQueue {
    lots: VecDeque<Lot>,
}

impl LotQueue {
    pub fn new() -> Self {
        Self { lots: VecDeque::new() }
    }

    /// Record an opening flow as a new lot at the back of the queue.
    pub fn push(&mut self, shares: Decimal, unit_cost: Decimal) {
        self.lots.push_back(Lot { shares, unit_cost });
    }

    /// Consume `shares` from the front against `close_unit`, returning the
    /// accumulated `consumed × (close_unit − lot.unit_cost)`. A partially
    /// consumed lot keeps its remaining shares at the same unit cost; fully
    /// consumed lots are discarded. Never consumes more than is queued.
    pub fn consume(&mut self, shares: Decimal, close_unit: Decimal) -> Decimal {
        let mut remaining = shares;
        let mut realized = Decimal::ZERO;

        while remaining > Decimal::ZERO {
            let Some(front) = self.lots.front_mut() else { break };
            if front.shares <= remaining {
                realized += front.shares * (close_unit - front.unit_cost);
                remaining -= front.shares;
                self.lots.pop_front();
            } else {
                realized += remaining * (close_unit - front.unit_cost);
                front.shares -= remaining;
                remaining = Decimal::ZERO;
            }
        }

        realized
    }

    pub fn remaining_shares(&self) -> Decimal {
        self.lots.iter().map(|lot| lot.shares).sum()
    }

    /// Cost basis of everything still queued, half-even at unit-cost scale.
    pub fn remaining_cost(&self) -> Decimal {
        round_unit_cost(self.lots.iter().map(|lot| lot.shares * lot.unit_cost).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn consumes_earliest_lot_first() {
        let mut queue = LotQueue::new();
        queue.push(dec!(100), dec!(10));
        queue.push(dec!(100), dec!(20));

        // 100 shares at 15 against the 10-cost lot only
        let realized = queue.consume(dec!(100), dec!(15));
        assert_eq!(realized, dec!(500));
        assert_eq!(queue.remaining_shares(), dec!(100));
        assert_eq!(queue.remaining_cost(), dec!(2000));
    }

    #[test]
    fn partial_lot_keeps_unit_cost() {
        let mut queue = LotQueue::new();
        queue.push(dec!(100), dec!(10));

        let realized = queue.consume(dec!(30), dec!(12));
        assert_eq!(realized, dec!(60));
        assert_eq!(queue.remaining_shares(), dec!(70));
        assert_eq!(queue.remaining_cost(), dec!(700));

        // second disposal still matches the original cost
        let realized = queue.consume(dec!(70), dec!(12));
        assert_eq!(realized, dec!(140));
        assert!(queue.is_empty());
    }

    #[test]
    fn consumption_spanning_lots() {
        let mut queue = LotQueue::new();
        queue.push(dec!(50), dec!(10));
        queue.push(dec!(50), dec!(20));

        let realized = queue.consume(dec!(80), dec!(30));
        // 50×(30−10) + 30×(30−20) = 1000 + 300
        assert_eq!(realized, dec!(1300));
        assert_eq!(queue.remaining_shares(), dec!(20));
    }

    #[test]
    fn never_consumes_more_than_queued() {
        let mut queue = LotQueue::new();
        queue.push(dec!(10), dec!(10));
        let realized = queue.consume(dec!(25), dec!(15));
        assert_eq!(realized, dec!(50));
        assert!(queue.is_empty());
    }
}
