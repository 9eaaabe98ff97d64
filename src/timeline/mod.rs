//! Timeline ordering and construction.
//!
//! `compare` defines the total order over events; `builder` merges a
//! transaction set with boundary markers, sorts it, and carries the running
//! position alongside.

pub mod builder;
pub mod compare;

pub use builder::{ShortPolicy, Timeline, Window};
pub use compare::timeline_order;
