//! Folio Core — transaction timeline ordering and cost-basis trade accounting.
//!
//! This crate is the ordering and accounting heart of a holdings tracker:
//! - Domain types (events, boundary markers, trades, exact money)
//! - A total-order timeline comparator safe for arbitrarily large
//!   same-instant batches
//! - Timeline construction with running position per event
//! - Trade collection (position leaving zero → returning to zero)
//! - Profit/loss per trade under FIFO lots and moving-average cost
//! - Parallel per-security fan-out with per-security error isolation
//!
//! The crate is pure computation: it does not fetch prices, persist data, or
//! render anything. Callers hand it a transaction snapshot per security and
//! get back the ordered timeline, the trades, and both cost-basis results.

pub mod convert;
pub mod costbasis;
pub mod domain;
pub mod error;
pub mod portfolio;
pub mod timeline;
pub mod trades;

pub use error::EngineError;
