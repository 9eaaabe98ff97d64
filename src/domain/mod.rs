//! Domain types: ids, money, timeline events, trades.

pub mod event;
pub mod ids;
pub mod money;
pub mod trade;

pub use event::{PositionSnapshot, TimelineEvent, TransactionEvent, TransactionKind};
pub use ids::{OwnerId, SecurityId, SequenceId};
pub use money::{round_unit_cost, Currency, Money, UNIT_COST_DP};
pub use trade::{Trade, TradeDirection};
