//! Cost-basis accounting — profit/loss per trade under two policies.
//!
//! FIFO lot matching and moving-average cost are independent, always both
//! computable for the same trade: reporting surfaces toggle between them at
//! display time, so neither result is privileged. Both consume the same
//! ordered constituent events and the same rounding rules, which makes each
//! reproducible bit-for-bit from the same input sequence.

pub mod fifo;
pub mod moving_average;

use crate::convert::CurrencyConverter;
use crate::domain::{
    round_unit_cost, Currency, Money, PositionSnapshot, TimelineEvent, Trade, TradeDirection,
    TransactionKind,
};
use crate::error::EngineError;
use crate::timeline::Timeline;
use chrono::NaiveDateTime;
use fifo::LotQueue;
use moving_average::RunningAverage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which accounting policy to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostMethod {
    Fifo,
    MovingAverage,
}

/// Profit/loss of one trade under one cost method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeProfit {
    pub method: CostMethod,
    /// Sum of all realization events plus income, minus fees.
    pub realized: Money,
    /// Against the supplied valuation (or the window-end snapshot) for open
    /// trades; `None` once closed or when no valuation is available.
    pub unrealized: Option<Money>,
}

/// Both cost methods side by side, the way reporting widgets consume them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePnl {
    pub fifo: TradeProfit,
    pub moving_average: TradeProfit,
}

/// Per-method basis state behind one interface so the event walk is written
/// once.
enum Basis {
    Fifo(LotQueue),
    MovingAverage(RunningAverage),
}

impl Basis {
    fn new(method: CostMethod) -> Self {
        match method {
            CostMethod::Fifo => Basis::Fifo(LotQueue::new()),
            CostMethod::MovingAverage => Basis::MovingAverage(RunningAverage::new()),
        }
    }

    fn open(&mut self, shares: Decimal, unit_cost: Decimal) {
        match self {
            Basis::Fifo(queue) => queue.push(shares, unit_cost),
            Basis::MovingAverage(avg) => avg.add(shares, unit_cost),
        }
    }

    fn close(&mut self, shares: Decimal, close_unit: Decimal) -> Decimal {
        match self {
            Basis::Fifo(queue) => queue.consume(shares, close_unit),
            Basis::MovingAverage(avg) => avg.realize(shares, close_unit),
        }
    }

    fn remaining_shares(&self) -> Decimal {
        match self {
            Basis::Fifo(queue) => queue.remaining_shares(),
            Basis::MovingAverage(avg) => avg.remaining_shares(),
        }
    }

    fn remaining_cost(&self) -> Decimal {
        match self {
            Basis::Fifo(queue) => queue.remaining_cost(),
            Basis::MovingAverage(avg) => avg.remaining_cost(),
        }
    }
}

/// Express `money` in `term`, converting when a converter is supplied.
fn amount_in(
    money: &Money,
    term: &Currency,
    at: NaiveDateTime,
    converter: Option<&dyn CurrencyConverter>,
) -> Result<Decimal, EngineError> {
    if money.currency == *term {
        return Ok(money.amount);
    }
    let Some(converter) = converter else {
        return Err(EngineError::InconsistentCurrency {
            expected: term.clone(),
            found: money.currency.clone(),
        });
    };
    let converted = converter.convert(money, at);
    if converted.currency != *term {
        return Err(EngineError::InconsistentCurrency {
            expected: term.clone(),
            found: converted.currency,
        });
    }
    Ok(converted.amount)
}

/// Compute realized and unrealized profit/loss for `trade` under `method`.
///
/// `valuation` supplies the current market value for open trades; when
/// absent, the window-end snapshot among the trade's events is used, and
/// unrealized stays `None` if neither exists. Results are expressed in the
/// trade's entry currency; foreign amounts go through `converter` or are
/// reported as inconsistent.
///
/// The valuation's `market_value` is the position's signed value: positive
/// for a long holding, negative for a short liability (unrealized is
/// `market_value − direction × remaining basis`, so a short covered below
/// its opening proceeds comes out positive).
pub fn profit_loss(
    timeline: &Timeline,
    trade: &Trade,
    method: CostMethod,
    valuation: Option<&PositionSnapshot>,
    converter: Option<&dyn CurrencyConverter>,
) -> Result<TradeProfit, EngineError> {
    let term = trade.entry_value.currency.clone();
    let direction = trade.direction.sign();

    let mut basis = Basis::new(method);
    let mut realized = Decimal::ZERO;
    let mut end_snapshot: Option<(&PositionSnapshot, NaiveDateTime)> = None;
    let mut last_instant = trade.entry_time;

    for &idx in &trade.events {
        match timeline.event(idx) {
            TimelineEvent::BoundaryStart { snapshot, timestamp, .. } => {
                if idx == trade.entry_event && !snapshot.shares.is_zero() {
                    let shares = snapshot.shares.abs();
                    let value =
                        amount_in(&snapshot.market_value, &term, *timestamp, converter)?;
                    basis.open(shares, round_unit_cost(value.abs() / shares));
                }
            }

            TimelineEvent::BoundaryEnd { snapshot, timestamp, .. } => {
                end_snapshot = Some((snapshot, *timestamp));
            }

            TimelineEvent::Transaction(t) => {
                last_instant = t.timestamp;

                if t.shares.is_zero() {
                    // Income and fees never touch the cost basis; they are
                    // direct cash contributions to profit/loss.
                    let amount = amount_in(&t.gross_amount, &term, t.timestamp, converter)?;
                    match t.kind {
                        TransactionKind::DividendOrInterest => realized += amount,
                        TransactionKind::TaxOrFee => realized -= amount,
                        _ => {}
                    }
                    continue;
                }

                let magnitude = t.shares.abs();
                let amount = amount_in(&t.gross_amount, &term, t.timestamp, converter)?;
                let unit = round_unit_cost(amount.abs() / magnitude);
                let opening =
                    (t.shares > Decimal::ZERO) == (trade.direction == TradeDirection::Long);

                if opening {
                    // A flip event opens this trade with only its excess
                    // portion; the running position after the event is
                    // exactly that portion.
                    let shares = if idx == trade.entry_event {
                        timeline.running_position()[idx].abs().min(magnitude)
                    } else {
                        magnitude
                    };
                    basis.open(shares, unit);
                } else {
                    // A flip event closing this trade consumes only what is
                    // still open; the excess belongs to the successor.
                    let shares = magnitude.min(basis.remaining_shares());
                    realized += direction * basis.close(shares, unit);
                }
            }
        }
    }

    let unrealized = if trade.exit_event.is_none() {
        let valuation_at = valuation
            .map(|snapshot| (snapshot, last_instant))
            .or(end_snapshot);
        match valuation_at {
            Some((snapshot, at)) => {
                let market_value = amount_in(&snapshot.market_value, &term, at, converter)?;
                let signed_basis = direction * basis.remaining_cost();
                Some(Money::new(term.clone(), market_value - signed_basis))
            }
            None => None,
        }
    } else {
        None
    };

    Ok(TradeProfit { method, realized: Money::new(term, realized), unrealized })
}

/// Both policies for the same trade, computed in one call.
pub fn profit_loss_both(
    timeline: &Timeline,
    trade: &Trade,
    valuation: Option<&PositionSnapshot>,
    converter: Option<&dyn CurrencyConverter>,
) -> Result<TradePnl, EngineError> {
    Ok(TradePnl {
        fifo: profit_loss(timeline, trade, CostMethod::Fifo, valuation, converter)?,
        moving_average: profit_loss(
            timeline,
            trade,
            CostMethod::MovingAverage,
            valuation,
            converter,
        )?,
    })
}
