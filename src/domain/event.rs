//! Timeline events — the closed tagged union every other component consumes.
//!
//! An event is either a real transaction (any flow affecting a holding) or a
//! synthetic boundary marker carrying the position snapshot at an analysis
//! window edge. The set of variants is closed on purpose: the ordering rules
//! and the accounting rules match exhaustively, so adding a kind forces both
//! to be reviewed together.

use super::ids::{OwnerId, SecurityId, SequenceId};
use super::money::Money;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of a real transaction.
///
/// Inbound kinds increase held shares, outbound kinds decrease them;
/// income/fee kinds are pure cash flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Purchase,
    Sale,
    InboundTransfer,
    OutboundTransfer,
    DividendOrInterest,
    TaxOrFee,
    Other,
}

/// A real transaction affecting one security's holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEvent {
    /// Stable creation-order identifier (input data, never generated here).
    pub sequence: SequenceId,
    /// Full date-time; ordering is by instant, not by day.
    pub timestamp: NaiveDateTime,
    pub kind: TransactionKind,
    pub security: SecurityId,
    pub owner: OwnerId,
    /// Signed share delta: > 0 inbound, < 0 outbound, 0 for pure cash flows.
    pub shares: Decimal,
    /// Magnitude of the cash leg in the settlement currency.
    pub gross_amount: Money,
}

/// Holdings at a point in time: shares and their market value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub shares: Decimal,
    pub market_value: Money,
}

/// One entry on a security's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimelineEvent {
    Transaction(TransactionEvent),
    /// Holdings as of the start of the analysis window. Not a cash flow.
    BoundaryStart {
        sequence: SequenceId,
        timestamp: NaiveDateTime,
        security: SecurityId,
        snapshot: PositionSnapshot,
    },
    /// Holdings as of the end of the analysis window. Not a cash flow.
    BoundaryEnd {
        sequence: SequenceId,
        timestamp: NaiveDateTime,
        security: SecurityId,
        snapshot: PositionSnapshot,
    },
}

impl TimelineEvent {
    pub fn sequence(&self) -> SequenceId {
        match self {
            TimelineEvent::Transaction(t) => t.sequence,
            TimelineEvent::BoundaryStart { sequence, .. } => *sequence,
            TimelineEvent::BoundaryEnd { sequence, .. } => *sequence,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            TimelineEvent::Transaction(t) => t.timestamp,
            TimelineEvent::BoundaryStart { timestamp, .. } => *timestamp,
            TimelineEvent::BoundaryEnd { timestamp, .. } => *timestamp,
        }
    }

    pub fn security(&self) -> &SecurityId {
        match self {
            TimelineEvent::Transaction(t) => &t.security,
            TimelineEvent::BoundaryStart { security, .. } => security,
            TimelineEvent::BoundaryEnd { security, .. } => security,
        }
    }

    pub fn is_boundary(&self) -> bool {
        !matches!(self, TimelineEvent::Transaction(_))
    }

    /// Signed share delta contributed to the running position. Boundary
    /// markers contribute nothing — they are checkpoints, not flows.
    pub fn signed_shares(&self) -> Decimal {
        match self {
            TimelineEvent::Transaction(t) => t.shares,
            _ => Decimal::ZERO,
        }
    }

    pub fn is_inbound(&self) -> bool {
        self.signed_shares() > Decimal::ZERO
    }

    pub fn affects_shares(&self) -> bool {
        !self.signed_shares().is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Currency;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(10, 0, 0).unwrap()
    }

    fn tx(kind: TransactionKind, shares: Decimal) -> TimelineEvent {
        TimelineEvent::Transaction(TransactionEvent {
            sequence: SequenceId(1),
            timestamp: ts(),
            kind,
            security: SecurityId::new("ACME"),
            owner: OwnerId::new("broker"),
            shares,
            gross_amount: Money::new(Currency::new("EUR"), dec!(100)),
        })
    }

    #[test]
    fn purchase_is_inbound() {
        let e = tx(TransactionKind::Purchase, dec!(10));
        assert!(e.is_inbound());
        assert!(e.affects_shares());
        assert!(!e.is_boundary());
    }

    #[test]
    fn sale_is_outbound() {
        let e = tx(TransactionKind::Sale, dec!(-10));
        assert!(!e.is_inbound());
        assert!(e.affects_shares());
    }

    #[test]
    fn dividend_is_pure_cash() {
        let e = tx(TransactionKind::DividendOrInterest, Decimal::ZERO);
        assert!(!e.affects_shares());
        assert!(!e.is_inbound());
    }

    #[test]
    fn boundaries_are_checkpoints_not_flows() {
        let e = TimelineEvent::BoundaryStart {
            sequence: SequenceId(9),
            timestamp: ts(),
            security: SecurityId::new("ACME"),
            snapshot: PositionSnapshot {
                shares: dec!(50),
                market_value: Money::new(Currency::new("EUR"), dec!(500)),
            },
        };
        assert!(e.is_boundary());
        assert!(!e.affects_shares());
        assert_eq!(e.signed_shares(), Decimal::ZERO);
    }
}
