//! Timeline construction: merge, sort, running position.
//!
//! A `Timeline` is a pure function of its inputs: the transaction set for
//! one security, plus optional window-edge snapshots that become synthetic
//! boundary events. Recomputing from the same inputs yields an identical
//! timeline, tie-breaks included, because the sequence ids driving the
//! ordering are input data.

use crate::domain::{
    Currency, PositionSnapshot, SecurityId, SequenceId, TimelineEvent, TransactionEvent,
};
use crate::error::EngineError;
use crate::timeline::compare::timeline_order;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a negative running position is accepted or reported.
///
/// This is an explicit caller choice, threaded through the builder and the
/// trade collector. There is no default and no silent clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortPolicy {
    /// A negative position is a data-consistency error.
    Forbid,
    /// Short positions are permitted; a flip splits the trade.
    Allow,
}

/// Analysis-window edges. Each edge supplies the externally computed
/// position snapshot that seeds the corresponding boundary marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub start: Option<(NaiveDateTime, PositionSnapshot)>,
    pub end: Option<(NaiveDateTime, PositionSnapshot)>,
}

/// The ordered event sequence for one security plus the parallel running
/// position (cumulative shares after each event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    security: SecurityId,
    events: Vec<TimelineEvent>,
    running: Vec<Decimal>,
}

impl Timeline {
    /// Merge `transactions` with the window's boundary markers, sort, and
    /// compute the running position.
    ///
    /// Boundary sequence ids are derived from the highest transaction
    /// sequence, so rebuilding from the same inputs is idempotent without
    /// the caller allocating ids for synthetic events.
    pub fn build(
        security: SecurityId,
        transactions: Vec<TransactionEvent>,
        window: Window,
        policy: ShortPolicy,
    ) -> Result<Timeline, EngineError> {
        for tx in &transactions {
            if tx.security != security {
                return Err(EngineError::CrossSecurityEvent {
                    sequence: tx.sequence,
                    expected: security,
                    found: tx.security.clone(),
                });
            }
        }

        let max_sequence = transactions.iter().map(|t| t.sequence.0).max().unwrap_or(0);

        let mut events: Vec<TimelineEvent> =
            transactions.into_iter().map(TimelineEvent::Transaction).collect();

        if let Some((timestamp, snapshot)) = window.start {
            events.push(TimelineEvent::BoundaryStart {
                sequence: SequenceId(max_sequence + 1),
                timestamp,
                security: security.clone(),
                snapshot,
            });
        }
        if let Some((timestamp, snapshot)) = window.end {
            events.push(TimelineEvent::BoundaryEnd {
                sequence: SequenceId(max_sequence + 2),
                timestamp,
                security: security.clone(),
                snapshot,
            });
        }

        events.sort_by(timeline_order);

        let mut running = Vec::with_capacity(events.len());
        let mut position = Decimal::ZERO;
        for event in &events {
            match event {
                // The window-start snapshot seeds the position; it is not a
                // flow and the boundary itself never mutates a position that
                // is already established.
                TimelineEvent::BoundaryStart { snapshot, .. } => position = snapshot.shares,
                TimelineEvent::BoundaryEnd { .. } => {}
                TimelineEvent::Transaction(t) => position += t.shares,
            }
            if policy == ShortPolicy::Forbid && position < Decimal::ZERO {
                return Err(EngineError::NegativeWithoutBoundary {
                    sequence: event.sequence(),
                    position,
                });
            }
            running.push(position);
        }

        tracing::debug!(
            security = %security,
            events = events.len(),
            "timeline built"
        );

        Ok(Timeline { security, events, running })
    }

    pub fn security(&self) -> &SecurityId {
        &self.security
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn event(&self, index: usize) -> &TimelineEvent {
        &self.events[index]
    }

    /// Cumulative shares after each event, parallel to `events()`.
    pub fn running_position(&self) -> &[Decimal] {
        &self.running
    }

    /// Settlement currency of the timeline: the currency of the first
    /// cash-bearing event. `None` on an empty timeline.
    pub fn currency(&self) -> Option<&Currency> {
        self.events.first().map(|event| match event {
            TimelineEvent::Transaction(t) => &t.gross_amount.currency,
            TimelineEvent::BoundaryStart { snapshot, .. } => &snapshot.market_value.currency,
            TimelineEvent::BoundaryEnd { snapshot, .. } => &snapshot.market_value.currency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Money, OwnerId, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn eur(amount: Decimal) -> Money {
        Money::new(Currency::new("EUR"), amount)
    }

    fn tx(seq: u64, timestamp: NaiveDateTime, shares: Decimal, gross: Decimal) -> TransactionEvent {
        let kind = if shares > dec!(0) {
            TransactionKind::Purchase
        } else if shares < dec!(0) {
            TransactionKind::Sale
        } else {
            TransactionKind::DividendOrInterest
        };
        TransactionEvent {
            sequence: SequenceId(seq),
            timestamp,
            kind,
            security: SecurityId::new("ACME"),
            owner: OwnerId::new("broker"),
            shares,
            gross_amount: eur(gross),
        }
    }

    #[test]
    fn sorts_and_accumulates() {
        let transactions = vec![
            tx(2, at(3, 10), dec!(-30), dec!(360)),
            tx(1, at(2, 10), dec!(100), dec!(1000)),
        ];
        let timeline = Timeline::build(
            SecurityId::new("ACME"),
            transactions,
            Window::default(),
            ShortPolicy::Forbid,
        )
        .unwrap();

        assert_eq!(timeline.events().len(), 2);
        assert_eq!(timeline.events()[0].sequence(), SequenceId(1));
        assert_eq!(timeline.running_position(), &[dec!(100), dec!(70)]);
        assert_eq!(timeline.currency(), Some(&Currency::new("EUR")));
    }

    #[test]
    fn window_start_seeds_position() {
        let window = Window {
            start: Some((
                at(1, 0),
                PositionSnapshot { shares: dec!(50), market_value: eur(dec!(500)) },
            )),
            end: Some((
                at(31, 0),
                PositionSnapshot { shares: dec!(20), market_value: eur(dec!(260)) },
            )),
        };
        let transactions = vec![tx(1, at(10, 12), dec!(-30), dec!(390))];
        let timeline = Timeline::build(
            SecurityId::new("ACME"),
            transactions,
            window,
            ShortPolicy::Forbid,
        )
        .unwrap();

        // start boundary, sale, end boundary
        assert_eq!(timeline.running_position(), &[dec!(50), dec!(20), dec!(20)]);
        assert!(timeline.events()[0].is_boundary());
        assert!(timeline.events()[2].is_boundary());
    }

    #[test]
    fn cross_security_event_rejects_batch() {
        let mut stray = tx(1, at(2, 10), dec!(10), dec!(100));
        stray.security = SecurityId::new("OTHER");
        let err = Timeline::build(
            SecurityId::new("ACME"),
            vec![stray],
            Window::default(),
            ShortPolicy::Forbid,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::CrossSecurityEvent { .. }));
    }

    #[test]
    fn negative_position_rejected_under_forbid() {
        let err = Timeline::build(
            SecurityId::new("ACME"),
            vec![tx(1, at(2, 10), dec!(-10), dec!(100))],
            Window::default(),
            ShortPolicy::Forbid,
        )
        .unwrap_err();
        assert!(
            matches!(err, EngineError::NegativeWithoutBoundary { position, .. } if position == dec!(-10))
        );
    }

    #[test]
    fn negative_position_allowed_under_allow() {
        let timeline = Timeline::build(
            SecurityId::new("ACME"),
            vec![tx(1, at(2, 10), dec!(-10), dec!(100))],
            Window::default(),
            ShortPolicy::Allow,
        )
        .unwrap();
        assert_eq!(timeline.running_position(), &[dec!(-10)]);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let transactions = vec![
            tx(1, at(2, 10), dec!(100), dec!(1000)),
            tx(2, at(2, 10), dec!(-100), dec!(1100)),
            tx(3, at(2, 10), dec!(50), dec!(525)),
        ];
        let build = || {
            Timeline::build(
                SecurityId::new("ACME"),
                transactions.clone(),
                Window::default(),
                ShortPolicy::Forbid,
            )
            .unwrap()
        };
        let a = serde_json::to_string(&build()).unwrap();
        let b = serde_json::to_string(&build()).unwrap();
        assert_eq!(a, b);
    }
}
