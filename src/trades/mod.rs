//! Trade collection.

pub mod collector;

pub use collector::collect_trades;
