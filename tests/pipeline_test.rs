use chrono::{Days, NaiveDate};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use stockscope::application::pipeline::{AnalysisPipeline, AnalysisRequest};
use stockscope::application::predictor::OlsTrendPredictor;
use stockscope::domain::errors::{AnalysisError, FetchError};
use stockscope::domain::ports::DataSource;
use stockscope::domain::types::{IndicatorKind, RawPricePoint, RawSeries, TimeWindow};
use stockscope::infrastructure::cache::FetchCache;

// --- Mocks ---

struct Inner {
    responses: Mutex<VecDeque<Result<RawSeries, FetchError>>>,
    calls: AtomicUsize,
}

/// Data source that plays back a fixed script of responses and counts calls.
#[derive(Clone)]
struct ScriptedSource {
    inner: Arc<Inner>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<RawSeries, FetchError>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

impl DataSource for ScriptedSource {
    fn fetch(&self, _ticker: &str, _window: &TimeWindow) -> Result<RawSeries, FetchError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected fetch call")
    }
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn raw_series(len: usize) -> RawSeries {
    RawSeries {
        ticker: "AAPL".to_string(),
        points: (0..len)
            .map(|i| {
                let close = 100.0 + i as f64 * 0.5;
                RawPricePoint {
                    timestamp: start_date() + Days::new(i as u64),
                    open: Some(close - 0.2),
                    high: Some(close + 1.0),
                    low: Some(close - 1.0),
                    close: Some(close),
                    volume: Some(1_000_000.0 + i as f64),
                }
            })
            .collect(),
    }
}

fn request(horizon_days: usize) -> AnalysisRequest {
    AnalysisRequest {
        ticker: "AAPL".to_string(),
        window: TimeWindow::OneYear,
        indicators: IndicatorKind::default_set(),
        horizon_days,
    }
}

fn pipeline(
    source: &ScriptedSource,
) -> AnalysisPipeline<ScriptedSource, OlsTrendPredictor> {
    AnalysisPipeline::new(source.clone(), OlsTrendPredictor::default())
}

// --- Tests ---

#[test]
fn unknown_ticker_yields_not_found_and_no_result() {
    let source = ScriptedSource::new(vec![Err(FetchError::NotFound {
        ticker: "ZZZZ1".to_string(),
    })]);
    let pipeline = pipeline(&source);

    let mut req = request(7);
    req.ticker = "ZZZZ1".to_string();
    match pipeline.run(&req) {
        Err(AnalysisError::Fetch(FetchError::NotFound { ticker })) => {
            assert_eq!(ticker, "ZZZZ1");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    // NotFound is not retried.
    assert_eq!(source.calls(), 1);
}

#[test]
fn timeout_is_retried_once_then_succeeds() {
    let source = ScriptedSource::new(vec![
        Err(FetchError::Timeout { duration_ms: 10_000 }),
        Ok(raw_series(60)),
    ]);
    let pipeline = pipeline(&source);

    let result = pipeline.run(&request(7)).unwrap();
    assert_eq!(source.calls(), 2);
    assert_eq!(result.series.len(), 60);
}

#[test]
fn second_timeout_aborts_the_request() {
    let source = ScriptedSource::new(vec![
        Err(FetchError::Timeout { duration_ms: 10_000 }),
        Err(FetchError::Timeout { duration_ms: 10_000 }),
    ]);
    let pipeline = pipeline(&source);

    match pipeline.run(&request(7)) {
        Err(AnalysisError::Fetch(FetchError::Timeout { .. })) => {}
        other => panic!("expected Timeout, got {other:?}"),
    }
    assert_eq!(source.calls(), 2);
}

#[test]
fn rate_limit_is_not_retried() {
    let source = ScriptedSource::new(vec![Err(FetchError::RateLimited {
        retry_after_secs: 30,
    })]);
    let pipeline = pipeline(&source);

    assert!(pipeline.run(&request(7)).is_err());
    assert_eq!(source.calls(), 1);
}

#[test]
fn short_series_fails_before_prediction() {
    // 5 valid points against the default minimum-fit threshold of 10.
    let source = ScriptedSource::new(vec![Ok(raw_series(5))]);
    let pipeline = pipeline(&source);

    match pipeline.run(&request(3)) {
        Err(AnalysisError::InsufficientData { required, actual }) => {
            assert_eq!(required, 10);
            assert_eq!(actual, 5);
        }
        other => panic!("expected InsufficientData, got {other:?}"),
    }
}

#[test]
fn happy_path_produces_an_aligned_result() {
    let source = ScriptedSource::new(vec![Ok(raw_series(60))]);
    let pipeline = pipeline(&source);

    let result = pipeline.run(&request(7)).unwrap();

    assert_eq!(result.series.len(), 60);
    for (name, column) in &result.indicators.columns {
        assert_eq!(column.len(), 60, "column {name} misaligned");
    }

    // SMA_50 becomes defined once its lookback is satisfied.
    let sma_50 = result.indicators.get("SMA_50").unwrap();
    assert!(sma_50[48].is_none());
    assert!(sma_50[49].is_some());

    // The rising series keeps RSI near the top of its range.
    let rsi = result.indicators.get("RSI_14").unwrap();
    assert!(rsi[59].unwrap() > 90.0);

    let prediction = result.prediction.as_ref().unwrap();
    assert_eq!(prediction.horizon.len(), 7);
    let last = result.series.last_timestamp().unwrap();
    assert!(prediction.horizon.iter().all(|d| *d > last));
}

#[test]
fn zero_horizon_skips_the_prediction_stage() {
    let source = ScriptedSource::new(vec![Ok(raw_series(60))]);
    let pipeline = pipeline(&source);

    let result = pipeline.run(&request(0)).unwrap();
    assert!(result.prediction.is_none());
}

#[test]
fn identical_requests_yield_identical_results() {
    let source = ScriptedSource::new(vec![Ok(raw_series(60)), Ok(raw_series(60))]);
    let pipeline = pipeline(&source);

    let first = pipeline.run(&request(7)).unwrap();
    let second = pipeline.run(&request(7)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cache_suppresses_the_second_fetch_within_ttl() {
    let source = ScriptedSource::new(vec![Ok(raw_series(60))]);
    let pipeline = pipeline(&source).with_cache(FetchCache::new(Duration::from_secs(60)));

    let first = pipeline.run(&request(7)).unwrap();
    let second = pipeline.run(&request(7)).unwrap();

    assert_eq!(source.calls(), 1);
    assert_eq!(first, second);
}

#[test]
fn dirty_raw_input_is_cleaned_before_analysis() {
    let mut raw = raw_series(40);
    // Shuffle in a duplicate timestamp, an unordered record, and a bad close.
    raw.points[5].close = Some(-1.0);
    let dup = RawPricePoint {
        close: Some(123.0),
        ..raw.points[10]
    };
    raw.points.push(dup);
    raw.points.swap(2, 20);

    let source = ScriptedSource::new(vec![Ok(raw)]);
    let pipeline = pipeline(&source);

    let result = pipeline.run(&request(5)).unwrap();
    let points = &result.series.points;
    assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));

    // The duplicated timestamp resolved to the last-seen record.
    let day_10 = start_date() + Days::new(10);
    let resolved = points.iter().find(|p| p.timestamp == day_10).unwrap();
    assert_eq!(resolved.close, 123.0);

    // The bad close became a single-record forward fill of the prior close.
    let day_5 = start_date() + Days::new(5);
    let filled = points.iter().find(|p| p.timestamp == day_5).unwrap();
    assert_eq!(filled.close, points.iter().find(|p| p.timestamp == start_date() + Days::new(4)).unwrap().close);
}
