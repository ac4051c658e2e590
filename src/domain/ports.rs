use crate::domain::errors::{AnalysisError, FetchError};
use crate::domain::types::{Prediction, RawSeries, Series, TimeWindow};

/// Provider of raw OHLCV records. Implementations own their transport and
/// must bound the call with a request-level timeout; the pipeline treats
/// `fetch` as a single synchronous external call.
pub trait DataSource: Send + Sync {
    fn fetch(&self, ticker: &str, window: &TimeWindow) -> Result<RawSeries, FetchError>;
}

/// Fits a model on the supplied series and extrapolates `horizon_days`
/// forward. Re-fit on every call, no retained state, and deterministic:
/// identical inputs must yield identical output. Horizon dates must strictly
/// post-date every timestamp in the fitting window.
pub trait TrendModel: Send + Sync {
    fn fit_predict(&self, series: &Series, horizon_days: usize)
    -> Result<Prediction, AnalysisError>;

    fn model_id(&self) -> &str;
}
