//! Trade collection — partitions an ordered timeline into discrete trades.
//!
//! Pure walk over the sorted events: a trade opens when the position leaves
//! zero (or at the window start if it opens non-zero) and closes when the
//! position next returns to exactly zero. Cash-only events that fall inside
//! a trade are attached to it; a flip through zero either splits the event
//! across two trades or is reported, depending on the short policy.

use crate::domain::{
    Currency, Money, SecurityId, TimelineEvent, Trade, TradeDirection,
};
use crate::error::EngineError;
use crate::timeline::{ShortPolicy, Timeline};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// State for the trade currently being assembled.
struct OpenTrade {
    direction: TradeDirection,
    entry_event: usize,
    entry_time: NaiveDateTime,
    events: Vec<usize>,
    peak: Decimal,
    entry_value: Money,
    exit_value: Money,
}

impl OpenTrade {
    fn close(self, security: &SecurityId, exit_event: usize, exit_time: NaiveDateTime) -> Trade {
        Trade {
            security: security.clone(),
            direction: self.direction,
            entry_event: self.entry_event,
            exit_event: Some(exit_event),
            events: self.events,
            shares_peak: self.peak,
            entry_value: self.entry_value,
            exit_value: Some(self.exit_value),
            entry_time: self.entry_time,
            exit_time: Some(exit_time),
        }
    }

    fn leave_open(self, security: &SecurityId) -> Trade {
        Trade {
            security: security.clone(),
            direction: self.direction,
            entry_event: self.entry_event,
            exit_event: None,
            events: self.events,
            shares_peak: self.peak,
            entry_value: self.entry_value,
            exit_value: None,
            entry_time: self.entry_time,
            exit_time: None,
        }
    }
}

fn direction_of(shares: Decimal) -> TradeDirection {
    if shares > Decimal::ZERO {
        TradeDirection::Long
    } else {
        TradeDirection::Short
    }
}

/// Values are accumulated in the timeline currency; a foreign-currency
/// event is reported, not coerced (the cost-basis engine is where a
/// converter may be supplied).
fn in_currency(money: &Money, currency: &Currency) -> Result<Money, EngineError> {
    if money.currency != *currency {
        return Err(EngineError::InconsistentCurrency {
            expected: currency.clone(),
            found: money.currency.clone(),
        });
    }
    Ok(money.clone())
}

/// Partition `timeline` into trades. Constituent events are referenced by
/// timeline index; nothing is copied.
pub fn collect_trades(
    timeline: &Timeline,
    policy: ShortPolicy,
) -> Result<Vec<Trade>, EngineError> {
    let currency = match timeline.currency() {
        Some(c) => c.clone(),
        None => return Ok(Vec::new()),
    };

    let mut trades = Vec::new();
    let mut open: Option<OpenTrade> = None;
    let mut before = Decimal::ZERO;

    for (idx, event) in timeline.events().iter().enumerate() {
        let after = timeline.running_position()[idx];

        match event {
            TimelineEvent::BoundaryStart { timestamp, snapshot, .. } => {
                if open.is_none() && !snapshot.shares.is_zero() {
                    open = Some(OpenTrade {
                        direction: direction_of(snapshot.shares),
                        entry_event: idx,
                        entry_time: *timestamp,
                        events: vec![idx],
                        peak: snapshot.shares.abs(),
                        entry_value: in_currency(&snapshot.market_value, &currency)?,
                        exit_value: Money::zero(currency.clone()),
                    });
                }
            }

            TimelineEvent::BoundaryEnd { .. } => {
                // The trade stays open across the window end; the marker is
                // kept among its events so the accounting engine can fall
                // back to the end snapshot for valuation.
                if let Some(state) = open.as_mut() {
                    state.events.push(idx);
                }
            }

            TimelineEvent::Transaction(t) => {
                if t.shares.is_zero() {
                    // Pure cash flow: belongs to the trade it falls inside,
                    // to no trade otherwise.
                    if let Some(state) = open.as_mut() {
                        state.events.push(idx);
                    }
                    continue;
                }

                let gross = in_currency(&t.gross_amount, &currency)?;

                match open.take() {
                    None => {
                        if t.shares < Decimal::ZERO && policy == ShortPolicy::Forbid {
                            return Err(EngineError::AmbiguousSplitOnFlip {
                                sequence: t.sequence,
                                excess: t.shares.abs(),
                            });
                        }
                        open = Some(OpenTrade {
                            direction: direction_of(t.shares),
                            entry_event: idx,
                            entry_time: t.timestamp,
                            events: vec![idx],
                            peak: after.abs(),
                            entry_value: gross,
                            exit_value: Money::zero(currency.clone()),
                        });
                    }

                    Some(mut state) => {
                        state.events.push(idx);
                        let same_direction =
                            direction_of(t.shares) == state.direction;

                        if same_direction {
                            // The peak can only grow while the position
                            // extends; closing flows shrink it, and on a flip
                            // the magnitude past zero belongs to the
                            // successor trade.
                            state.peak = state.peak.max(after.abs());
                            state.entry_value = state.entry_value.try_add(&gross)?;
                            open = Some(state);
                        } else if after.is_zero() {
                            state.exit_value = state.exit_value.try_add(&gross)?;
                            trades.push(state.close(timeline.security(), idx, t.timestamp));
                        } else if direction_of(after) == state.direction {
                            // Partial close.
                            state.exit_value = state.exit_value.try_add(&gross)?;
                            open = Some(state);
                        } else {
                            // Flip: the event's magnitude exceeds the open
                            // shares and the position crosses through zero.
                            if policy == ShortPolicy::Forbid {
                                return Err(EngineError::AmbiguousSplitOnFlip {
                                    sequence: t.sequence,
                                    excess: after.abs(),
                                });
                            }
                            // Split at the event's unit price: the closing
                            // portion finishes the current trade, the excess
                            // opens the successor in the opposite direction.
                            // The event is a constituent of both trades.
                            let unit = gross.unit_cost(t.shares.abs());
                            let closing = Money::new(currency.clone(), unit * before.abs());
                            state.exit_value = state.exit_value.try_add(&closing)?;
                            trades.push(state.close(timeline.security(), idx, t.timestamp));

                            open = Some(OpenTrade {
                                direction: direction_of(after),
                                entry_event: idx,
                                entry_time: t.timestamp,
                                events: vec![idx],
                                peak: after.abs(),
                                entry_value: Money::new(currency.clone(), unit * after.abs()),
                                exit_value: Money::zero(currency.clone()),
                            });
                        }
                    }
                }
            }
        }

        before = after;
    }

    if let Some(state) = open {
        trades.push(state.leave_open(timeline.security()));
    }

    Ok(trades)
}
