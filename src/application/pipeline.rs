//! Request orchestration: fetch → clean → indicators → predict → assemble.
//!
//! One request is one synchronous pass with no shared mutable state; the
//! pipeline is a pure function of its inputs plus the external fetch result.
//! On any stage failure the whole request aborts — no partial results.

use crate::application::{assembler, cleaner, indicators};
use crate::domain::errors::{AnalysisError, FetchError};
use crate::domain::ports::{DataSource, TrendModel};
use crate::domain::types::{AnalysisResult, IndicatorKind, RawSeries, TimeWindow};
use crate::infrastructure::cache::FetchCache;
use tracing::{debug, info, warn};

/// One user request: what to fetch and what to derive from it.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub window: TimeWindow,
    pub indicators: Vec<IndicatorKind>,
    /// 0 disables the prediction stage.
    pub horizon_days: usize,
}

pub struct AnalysisPipeline<S, M> {
    source: S,
    model: M,
    cache: Option<FetchCache>,
}

impl<S: DataSource, M: TrendModel> AnalysisPipeline<S, M> {
    pub fn new(source: S, model: M) -> Self {
        Self {
            source,
            model,
            cache: None,
        }
    }

    /// Attaches an explicit fetch cache. Purely a performance optimization;
    /// correctness never depends on it.
    pub fn with_cache(mut self, cache: FetchCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Runs one request end to end.
    pub fn run(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        info!(
            ticker = %request.ticker,
            window = %request.window,
            horizon = request.horizon_days,
            "starting analysis"
        );

        let raw = self.fetch(&request.ticker, &request.window)?;
        let series = cleaner::clean(&raw)?;
        debug!(
            ticker = %request.ticker,
            raw = raw.points.len(),
            cleaned = series.len(),
            "cleaned series"
        );

        let indicator_set = indicators::compute(&series, &request.indicators);

        let prediction = if request.horizon_days > 0 {
            Some(self.model.fit_predict(&series, request.horizon_days)?)
        } else {
            None
        };

        assembler::assemble(series, indicator_set, prediction)
    }

    /// Fetches raw records, consulting the cache first. A `Timeout` gets one
    /// immediate retry; every other fetch error surfaces as-is.
    fn fetch(&self, ticker: &str, window: &TimeWindow) -> Result<RawSeries, FetchError> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(ticker, window) {
                debug!(ticker, %window, "fetch cache hit");
                return Ok(hit);
            }
        }

        let raw = match self.source.fetch(ticker, window) {
            Err(FetchError::Timeout { duration_ms }) => {
                warn!(ticker, duration_ms, "fetch timed out, retrying once");
                self.source.fetch(ticker, window)?
            }
            other => other?,
        };

        if let Some(cache) = &self.cache {
            cache.put(ticker, window, raw.clone());
        }
        Ok(raw)
    }
}
