//! Currency-conversion seam.
//!
//! The engine never fabricates exchange rates. When results must be
//! expressed in a currency other than an event's settlement currency, the
//! caller supplies this capability as a black box.

use crate::domain::{Currency, Money};
use chrono::NaiveDateTime;

/// Converts amounts into one fixed term currency at a given instant.
///
/// `Sync` because the portfolio fan-out shares one converter across worker
/// threads.
pub trait CurrencyConverter: Sync {
    /// The currency every conversion resolves to.
    fn term_currency(&self) -> &Currency;

    /// Convert `money` into the term currency at `at`.
    fn convert(&self, money: &Money, at: NaiveDateTime) -> Money;
}
