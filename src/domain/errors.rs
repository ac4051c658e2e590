use thiserror::Error;

/// Errors raised by a data source while retrieving raw OHLCV records.
///
/// These are user-actionable ("try a different symbol or time range") and are
/// never retried automatically, with one exception: the pipeline performs a
/// single immediate retry on `Timeout`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("ticker not found: {ticker}")]
    NotFound { ticker: String },

    #[error("rate limited by data source: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("transport failure: {reason}")]
    Transport { reason: String },
}

/// Errors raised by the analysis pipeline itself.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Too few valid points survived for the requested stage. Halts the
    /// pipeline before indicators or prediction run.
    #[error("insufficient data: {actual} valid points, need at least {required}")]
    InsufficientData { required: usize, actual: usize },

    /// An indicator or prediction column disagrees with the owning series.
    /// This is an internal invariant violation, not a user error.
    #[error("misaligned column {column}: {len} values for a series of {expected} points")]
    Alignment {
        column: String,
        len: usize,
        expected: usize,
    },

    /// The regression solver rejected otherwise-valid input. Internal-bug
    /// class, same as `Alignment`.
    #[error("model fit failed: {reason}")]
    ModelFit { reason: String },
}
