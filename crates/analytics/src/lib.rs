//! MarketLens analytics crate.
//!
//! Stateless, single-pass descriptive statistics over normalized OHLCV
//! tables: summary stats, distribution shapes, return series, and
//! cross-symbol rank correlation. Every function takes a table or a
//! numeric slice and emits a serializable result; there is no state and
//! no I/O here.

pub mod correlation;
pub mod describe;
pub mod errors;
pub mod histogram;
pub mod normality;
pub mod returns;

pub use correlation::{spearman, spearman_matrix, CorrelationMatrix};
pub use describe::{describe, describe_table, Describe};
pub use errors::AnalyticsError;
pub use histogram::{box_stats, histogram, BoxStats, Histogram, MAX_BINS};
pub use normality::{normal_test, NormalTest};
pub use returns::{cumulative_from, pct_change, table_returns, total_change_pct, TableReturns};
