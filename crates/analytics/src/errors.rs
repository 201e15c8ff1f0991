use thiserror::Error;

/// Errors from the descriptive-statistics transforms.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// The input series has no observations.
    #[error("Empty series")]
    EmptySeries,

    /// The statistic needs more observations than were supplied.
    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData {
        /// Minimum observations the statistic is defined for
        needed: usize,
        /// Observations supplied
        got: usize,
    },

    /// The series has no variance, so the statistic is undefined.
    #[error("Degenerate series: all values are equal")]
    DegenerateSeries,

    /// Paired series of different lengths where equal lengths are required.
    #[error("Length mismatch: {left} vs {right}")]
    LengthMismatch {
        /// Left-hand series length
        left: usize,
        /// Right-hand series length
        right: usize,
    },
}
