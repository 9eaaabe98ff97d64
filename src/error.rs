//! Errors scoped to one security's computation.
//!
//! A failure here never aborts sibling securities — the portfolio fan-out
//! reports each security's `Result` in its own slot. Nothing is retried;
//! there is no I/O to retry.

use crate::domain::{Currency, SecurityId, SequenceId};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// An event references a security other than the timeline's declared
    /// one. Fatal for the whole batch.
    #[error("event {sequence} references security {found}, timeline is for {expected}")]
    CrossSecurityEvent {
        sequence: SequenceId,
        expected: SecurityId,
        found: SecurityId,
    },

    /// The running position would go negative while short positions are
    /// disabled by policy.
    #[error("position {position} after event {sequence} is negative and short positions are disabled")]
    NegativeWithoutBoundary {
        sequence: SequenceId,
        position: Decimal,
    },

    /// An outbound event exceeds the open shares of the current trade while
    /// short positions are disabled. Reported, never silently clamped.
    #[error("event {sequence} exceeds open shares by {excess} and short positions are disabled")]
    AmbiguousSplitOnFlip {
        sequence: SequenceId,
        excess: Decimal,
    },

    /// An event's currency cannot be reconciled without a converter.
    #[error("currency mismatch: expected {expected}, found {found}")]
    InconsistentCurrency { expected: Currency, found: Currency },
}
