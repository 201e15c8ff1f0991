use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Candle granularity.
///
/// The set is fixed; every provider maps these onto whatever interval
/// codes its upstream venue understands. Venues that have no bucket for
/// a given granularity reject the request instead of substituting a
/// neighbouring one.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeFrame {
    Hour1,
    Hour4,
    Hour8,
    Hour12,
    Day1,
    Day3,
    Week1,
    Month1,
}

impl TimeFrame {
    /// All supported time frames, in ascending granularity order.
    pub const ALL: [TimeFrame; 8] = [
        TimeFrame::Hour1,
        TimeFrame::Hour4,
        TimeFrame::Hour8,
        TimeFrame::Hour12,
        TimeFrame::Day1,
        TimeFrame::Day3,
        TimeFrame::Week1,
        TimeFrame::Month1,
    ];

    /// Canonical string form as it appears in the selection UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Hour1 => "1h",
            TimeFrame::Hour4 => "4h",
            TimeFrame::Hour8 => "8h",
            TimeFrame::Hour12 => "12h",
            TimeFrame::Day1 => "1d",
            TimeFrame::Day3 => "3d",
            TimeFrame::Week1 => "1w",
            TimeFrame::Month1 => "1M",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1h" => Ok(TimeFrame::Hour1),
            "4h" => Ok(TimeFrame::Hour4),
            "8h" => Ok(TimeFrame::Hour8),
            "12h" => Ok(TimeFrame::Hour12),
            "1d" => Ok(TimeFrame::Day1),
            "3d" => Ok(TimeFrame::Day3),
            "1w" => Ok(TimeFrame::Week1),
            "1M" => Ok(TimeFrame::Month1),
            other => Err(MarketDataError::InvalidTimeFrame(other.to_string())),
        }
    }
}

impl TryFrom<String> for TimeFrame {
    type Error = MarketDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeFrame> for String {
    fn from(value: TimeFrame) -> Self {
        value.as_str().to_string()
    }
}
