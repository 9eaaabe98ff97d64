//! Total ordering over timeline events.
//!
//! `sort_by` (and every other general-purpose sort) requires a strict weak
//! ordering; a comparator that is not truly transitive blows up on large
//! same-instant batches. The relation here is a genuine total order:
//!
//! 1. Placement class: `BoundaryStart` before everything, `BoundaryEnd`
//!    after everything, regardless of timestamp.
//! 2. Within transactions: timestamp (full date-time), earlier first.
//! 3. At equal timestamp: fixed kind rank — inbound kinds first, then
//!    income/fee kinds, then outbound kinds. A same-instant acquisition must
//!    register before the disposal, or the running position transiently goes
//!    negative for a holding that never was short.
//! 4. Final tie-break: `SequenceId` ascending. The pre-assigned creation
//!    order makes the relation total over any multiset, so repeated sorts of
//!    the same input can never disagree.

use crate::domain::{TimelineEvent, TransactionKind};
use std::cmp::Ordering;

/// Placement class: boundary starts first, boundary ends last.
fn placement(event: &TimelineEvent) -> u8 {
    match event {
        TimelineEvent::BoundaryStart { .. } => 0,
        TimelineEvent::Transaction(_) => 1,
        TimelineEvent::BoundaryEnd { .. } => 2,
    }
}

/// Rank applied between transactions sharing an instant.
///
/// | rank | kind               |
/// |------|--------------------|
/// | 0    | Purchase           |
/// | 1    | InboundTransfer    |
/// | 2    | DividendOrInterest |
/// | 3    | TaxOrFee           |
/// | 4    | Other              |
/// | 5    | Sale               |
/// | 6    | OutboundTransfer   |
fn kind_rank(kind: TransactionKind) -> u8 {
    match kind {
        TransactionKind::Purchase => 0,
        TransactionKind::InboundTransfer => 1,
        TransactionKind::DividendOrInterest => 2,
        TransactionKind::TaxOrFee => 3,
        TransactionKind::Other => 4,
        TransactionKind::Sale => 5,
        TransactionKind::OutboundTransfer => 6,
    }
}

/// Compare two events belonging to the same security's timeline.
pub fn timeline_order(a: &TimelineEvent, b: &TimelineEvent) -> Ordering {
    placement(a).cmp(&placement(b)).then_with(|| match (a, b) {
        (TimelineEvent::Transaction(ta), TimelineEvent::Transaction(tb)) => ta
            .timestamp
            .cmp(&tb.timestamp)
            .then_with(|| kind_rank(ta.kind).cmp(&kind_rank(tb.kind)))
            .then_with(|| ta.sequence.cmp(&tb.sequence)),
        // Same placement class but not both transactions: two boundary
        // markers of the same edge. Their own creation order decides.
        _ => a.sequence().cmp(&b.sequence()),
    })
}
