//! Per-security fan-out.
//!
//! Each security's computation is a pure function of its own snapshot of
//! events, so the portfolio level parallelizes across securities and keeps
//! each individual computation strictly sequential. A failure for one
//! security lands in that security's result slot and never aborts the
//! siblings.

use crate::convert::CurrencyConverter;
use crate::costbasis::{profit_loss_both, TradePnl};
use crate::domain::{PositionSnapshot, SecurityId, Trade, TransactionEvent};
use crate::error::EngineError;
use crate::timeline::{ShortPolicy, Timeline, Window};
use crate::trades::collect_trades;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Everything the engine needs for one security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityInput {
    pub security: SecurityId,
    pub transactions: Vec<TransactionEvent>,
    pub window: Window,
    /// Current valuation for open trades, if the caller has one.
    pub valuation: Option<PositionSnapshot>,
}

/// Ordered events, trades, and both cost-basis results per trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub timeline: Timeline,
    pub trades: Vec<Trade>,
    /// Parallel to `trades`.
    pub pnl: Vec<TradePnl>,
}

/// Run the whole pipeline for one security.
pub fn compute_security(
    input: SecurityInput,
    policy: ShortPolicy,
    converter: Option<&dyn CurrencyConverter>,
) -> Result<SecurityReport, EngineError> {
    let timeline =
        Timeline::build(input.security, input.transactions, input.window, policy)?;
    let trades = collect_trades(&timeline, policy)?;

    let pnl = trades
        .iter()
        .map(|trade| {
            profit_loss_both(&timeline, trade, input.valuation.as_ref(), converter)
        })
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        security = %timeline.security(),
        trades = trades.len(),
        "security computed"
    );

    Ok(SecurityReport { timeline, trades, pnl })
}

/// Compute every security in parallel. Each slot carries its own result;
/// one security failing is logged and reported without touching the others.
pub fn compute_portfolio(
    inputs: Vec<SecurityInput>,
    policy: ShortPolicy,
    converter: Option<&dyn CurrencyConverter>,
) -> Vec<(SecurityId, Result<SecurityReport, EngineError>)> {
    inputs
        .into_par_iter()
        .map(|input| {
            let security = input.security.clone();
            let result = compute_security(input, policy, converter);
            if let Err(err) = &result {
                tracing::warn!(security = %security, error = %err, "security computation failed");
            }
            (security, result)
        })
        .collect()
}
