use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// One OHLCV bar in the common schema.
///
/// Every field is always populated; partially filled rows coming back
/// from an upstream source are dropped during normalization rather than
/// carried through as holes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bar timestamp, serialized as ISO-8601.
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(date: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Whether all five value fields hold finite numbers.
    pub fn is_complete(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Normalized candle history for one (symbol, time frame) pair.
///
/// Rows are ordered ascending by `date` (non-decreasing; venues can
/// legitimately report two bars with the same timestamp around session
/// boundaries). The table is read-only once built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OhlcvTable {
    rows: Vec<Candle>,
}

impl OhlcvTable {
    /// Build a table from rows, sorting them into ascending date order
    /// and validating the row invariant.
    pub fn from_rows(mut rows: Vec<Candle>) -> Result<Self, MarketDataError> {
        rows.sort_by_key(|c| c.date);
        let table = Self { rows };
        table.validate()?;
        Ok(table)
    }

    /// Check the table invariants: complete rows, non-decreasing dates.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if let Some(bad) = self.rows.iter().find(|c| !c.is_complete()) {
            return Err(MarketDataError::UnexpectedSchema {
                provider: String::new(),
                message: format!("incomplete candle at {}", bad.date),
            });
        }
        if let Some(w) = self.rows.windows(2).find(|w| w[0].date > w[1].date) {
            return Err(MarketDataError::UnexpectedSchema {
                provider: String::new(),
                message: format!("rows out of order at {}", w[1].date),
            });
        }
        Ok(())
    }

    pub fn rows(&self) -> &[Candle] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Candle> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.rows.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|c| c.close).collect()
    }

    pub fn column(&self, column: OhlcvColumn) -> Vec<f64> {
        self.rows.iter().map(|c| column.of(c)).collect()
    }
}

/// The five value columns of the common schema.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OhlcvColumn {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl OhlcvColumn {
    pub const ALL: [OhlcvColumn; 5] = [
        OhlcvColumn::Open,
        OhlcvColumn::High,
        OhlcvColumn::Low,
        OhlcvColumn::Close,
        OhlcvColumn::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OhlcvColumn::Open => "open",
            OhlcvColumn::High => "high",
            OhlcvColumn::Low => "low",
            OhlcvColumn::Close => "close",
            OhlcvColumn::Volume => "volume",
        }
    }

    pub fn of(&self, candle: &Candle) -> f64 {
        match self {
            OhlcvColumn::Open => candle.open,
            OhlcvColumn::High => candle.high,
            OhlcvColumn::Low => candle.low,
            OhlcvColumn::Close => candle.close,
            OhlcvColumn::Volume => candle.volume,
        }
    }
}

impl std::str::FromStr for OhlcvColumn {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(OhlcvColumn::Open),
            "high" => Ok(OhlcvColumn::High),
            "low" => Ok(OhlcvColumn::Low),
            "close" => Ok(OhlcvColumn::Close),
            "volume" => Ok(OhlcvColumn::Volume),
            other => Err(MarketDataError::UnexpectedSchema {
                provider: String::new(),
                message: format!("unknown column '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(ts: i64, close: f64) -> Candle {
        let date = Utc.timestamp_opt(ts, 0).unwrap();
        Candle::new(date, close, close, close, close, 1.0)
    }

    #[test]
    fn test_from_rows_sorts_ascending() {
        let table =
            OhlcvTable::from_rows(vec![candle(300, 3.0), candle(100, 1.0), candle(200, 2.0)])
                .unwrap();

        let dates: Vec<i64> = table.rows().iter().map(|c| c.date.timestamp()).collect();
        assert_eq!(dates, vec![100, 200, 300]);
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let mut bad = candle(100, 1.0);
        bad.volume = f64::NAN;

        let err = OhlcvTable::from_rows(vec![bad]).unwrap_err();
        assert!(matches!(err, MarketDataError::UnexpectedSchema { .. }));
    }

    #[test]
    fn test_equal_dates_are_allowed() {
        // Non-decreasing, not strictly increasing.
        let table = OhlcvTable::from_rows(vec![candle(100, 1.0), candle(100, 1.5)]).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_column_accessor() {
        let table = OhlcvTable::from_rows(vec![candle(100, 1.0), candle(200, 2.0)]).unwrap();
        assert_eq!(table.column(OhlcvColumn::Close), vec![1.0, 2.0]);
        assert_eq!(table.closes(), vec![1.0, 2.0]);
    }
}
