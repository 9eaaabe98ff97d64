//! Trade — a contiguous span of non-zero position in one security.
//!
//! A trade owns no events. It references them by index into the owning
//! timeline's event vector, is immutable once constructed, and is discarded
//! whenever the timeline is recomputed.

use super::ids::SecurityId;
use super::money::Money;
use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether the position during the trade was held long or short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    Long,
    Short,
}

impl TradeDirection {
    /// Sign multiplier: +1 for long, -1 for short.
    pub fn sign(self) -> Decimal {
        match self {
            TradeDirection::Long => Decimal::ONE,
            TradeDirection::Short => -Decimal::ONE,
        }
    }
}

/// A span from the position leaving zero until it next returns to zero, or
/// until the window end if it never does (open trade).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub security: SecurityId,
    pub direction: TradeDirection,
    /// Index of the opening event in the timeline.
    pub entry_event: usize,
    /// Index of the closing event; `None` while the trade is open.
    pub exit_event: Option<usize>,
    /// Ordered constituent events, by timeline index.
    pub events: Vec<usize>,
    /// Largest absolute position reached inside the trade.
    pub shares_peak: Decimal,
    /// Accumulated opening-direction value (acquisition cost for longs,
    /// opening proceeds for shorts; boundary market value when opened at a
    /// window start).
    pub entry_value: Money,
    /// Accumulated closing-direction value; `None` while open.
    pub exit_value: Option<Money>,
    pub entry_time: NaiveDateTime,
    pub exit_time: Option<NaiveDateTime>,
}

impl Trade {
    pub fn is_closed(&self) -> bool {
        self.exit_event.is_some()
    }

    /// Exit minus entry instant; `None` while the trade is open.
    pub fn holding_period(&self) -> Option<Duration> {
        self.exit_time.map(|exit| exit.signed_duration_since(self.entry_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Currency;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample_trade() -> Trade {
        let entry = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(9, 30, 0).unwrap();
        let exit = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap().and_hms_opt(16, 0, 0).unwrap();
        Trade {
            security: SecurityId::new("ACME"),
            direction: TradeDirection::Long,
            entry_event: 0,
            exit_event: Some(2),
            events: vec![0, 1, 2],
            shares_peak: dec!(100),
            entry_value: Money::new(Currency::new("EUR"), dec!(1000)),
            exit_value: Some(Money::new(Currency::new("EUR"), dec!(1100))),
            entry_time: entry,
            exit_time: Some(exit),
        }
    }

    #[test]
    fn holding_period_of_closed_trade() {
        let trade = sample_trade();
        assert!(trade.is_closed());
        let period = trade.holding_period().unwrap();
        assert_eq!(period, Duration::days(6) + Duration::hours(6) + Duration::minutes(30));
    }

    #[test]
    fn open_trade_has_no_holding_period() {
        let mut trade = sample_trade();
        trade.exit_event = None;
        trade.exit_value = None;
        trade.exit_time = None;
        assert!(!trade.is_closed());
        assert!(trade.holding_period().is_none());
    }

    #[test]
    fn direction_signs() {
        assert_eq!(TradeDirection::Long.sign(), Decimal::ONE);
        assert_eq!(TradeDirection::Short.sign(), -Decimal::ONE);
    }

    #[test]
    fn trade_serialization_roundtrip() {
        let trade = sample_trade();
        let json = serde_json::to_string(&trade).unwrap();
        let deser: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deser);
    }
}
