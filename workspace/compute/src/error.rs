use model::period::{ParseGranularityError, TimeGranularity};
use thiserror::Error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// A granularity string with no known spelling. This is a configuration
    /// error: the granularity set is closed and the value cannot be recovered.
    #[error("Granularity error: {0}")]
    Granularity(#[from] ParseGranularityError),

    /// A period label that does not parse back under the given granularity.
    #[error("Invalid period label `{label}` for {granularity} granularity")]
    InvalidPeriodLabel {
        label: String,
        granularity: TimeGranularity,
    },

    /// Error from date operations
    #[error("Date error: {0}")]
    Date(String),
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
