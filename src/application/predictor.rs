//! Trend extrapolation via ordinary least squares.
//!
//! The model regresses closing price against an ordinal time index over a
//! trailing window and extends the fitted line forward. This is a deliberate
//! interpretability tradeoff: a trend extrapolation, not a forecast
//! guarantee. The fit is repeated from scratch on every call and contains no
//! randomness, so identical inputs always produce identical output.

use crate::domain::errors::AnalysisError;
use crate::domain::ports::TrendModel;
use crate::domain::types::{Prediction, Series, TrainedWindow};
use chrono::Days;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use statrs::statistics::{Data, Distribution};
use tracing::debug;

/// Fewest points accepted for a stable fit.
pub const MIN_FIT_POINTS: usize = 10;

/// Default trailing window used for fitting.
pub const DEFAULT_LOOKBACK: usize = 30;

/// Largest per-day move the extrapolation is allowed to take, as a fraction
/// of the previous level. Keeps a steep fitted slope from compounding into
/// absurd levels over a long horizon.
const MAX_DAILY_MOVE: f64 = 0.03;

/// Least-squares linear trend over an ordinal time index.
pub struct OlsTrendPredictor {
    lookback: usize,
    min_points: usize,
}

impl OlsTrendPredictor {
    pub fn new(lookback: usize, min_points: usize) -> Self {
        Self {
            lookback,
            min_points,
        }
    }
}

impl Default for OlsTrendPredictor {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKBACK, MIN_FIT_POINTS)
    }
}

impl TrendModel for OlsTrendPredictor {
    fn fit_predict(
        &self,
        series: &Series,
        horizon_days: usize,
    ) -> Result<Prediction, AnalysisError> {
        // A configured threshold below 2 would still leave the fit degenerate.
        let required = self.min_points.max(2);
        if series.len() < required {
            return Err(AnalysisError::InsufficientData {
                required,
                actual: series.len(),
            });
        }

        let start = series.len().saturating_sub(self.lookback);
        let window = &series.points[start..];
        let closes: Vec<f64> = window.iter().map(|p| p.close).collect();

        let rows: Vec<Vec<f64>> = (0..closes.len()).map(|i| vec![i as f64]).collect();
        let x = DenseMatrix::from_2d_vec(&rows)
            .map_err(|e| AnalysisError::ModelFit {
                reason: e.to_string(),
            })?;
        let model = LinearRegression::fit(&x, &closes, LinearRegressionParameters::default())
            .map_err(|e| AnalysisError::ModelFit {
                reason: e.to_string(),
            })?;

        let future_rows: Vec<Vec<f64>> = (closes.len()..closes.len() + horizon_days)
            .map(|i| vec![i as f64])
            .collect();
        let predicted = if horizon_days == 0 {
            Vec::new()
        } else {
            let future_x =
                DenseMatrix::from_2d_vec(&future_rows).map_err(|e| AnalysisError::ModelFit {
                    reason: e.to_string(),
                })?;
            model.predict(&future_x).map_err(|e| AnalysisError::ModelFit {
                reason: e.to_string(),
            })?
        };

        // Walk the fitted line forward, bounding each step at MAX_DAILY_MOVE
        // from the previous level. The anchor is the last observed close.
        let last_close = closes[closes.len() - 1];
        let mut level = last_close;
        let predicted_close: Vec<f64> = predicted
            .iter()
            .map(|&raw| {
                let clamped = raw
                    .min(level * (1.0 + MAX_DAILY_MOVE))
                    .max(level * (1.0 - MAX_DAILY_MOVE));
                level = clamped;
                clamped
            })
            .collect();

        let volatility = daily_return_volatility(&closes);
        let upper_bound: Vec<f64> = predicted_close.iter().map(|p| p * (1.0 + volatility)).collect();
        let lower_bound: Vec<f64> = predicted_close.iter().map(|p| p * (1.0 - volatility)).collect();

        // Horizon dates are consecutive calendar days strictly after the last
        // observed timestamp, so nothing in the fit window can leak forward.
        let last_timestamp = window[window.len() - 1].timestamp;
        let horizon: Vec<_> = (1..=horizon_days as u64)
            .map(|d| last_timestamp + Days::new(d))
            .collect();

        debug!(
            ticker = %series.ticker,
            window = closes.len(),
            horizon = horizon_days,
            volatility,
            "fitted trend model"
        );

        Ok(Prediction {
            model_id: self.model_id().to_string(),
            horizon,
            predicted_close,
            upper_bound,
            lower_bound,
            volatility,
            trained_on: TrainedWindow {
                start: window[0].timestamp,
                end: last_timestamp,
                points: window.len(),
            },
        })
    }

    fn model_id(&self) -> &str {
        "ols_time_index"
    }
}

/// Sample standard deviation of day-over-day returns; 0.0 when the window is
/// too short or perfectly flat.
fn daily_return_volatility(closes: &[f64]) -> f64 {
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }
    Data::new(returns)
        .std_dev()
        .filter(|s| s.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::PricePoint;
    use chrono::NaiveDate;

    fn series_from_closes(closes: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Series {
            ticker: "TEST".to_string(),
            points: closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PricePoint {
                    timestamp: start + Days::new(i as u64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1000.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_fit_predict_rejects_short_series() {
        let series = series_from_closes(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let predictor = OlsTrendPredictor::default();
        match predictor.fit_predict(&series, 3) {
            Err(AnalysisError::InsufficientData { required, actual }) => {
                assert_eq!(required, MIN_FIT_POINTS);
                assert_eq!(actual, 5);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn test_fit_predict_extends_a_linear_trend() {
        // Slope 0.5 on a base of 100: well inside the daily-move bound.
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.5).collect();
        let series = series_from_closes(&closes);
        let prediction = OlsTrendPredictor::default().fit_predict(&series, 3).unwrap();

        let last = closes[closes.len() - 1];
        for (i, value) in prediction.predicted_close.iter().enumerate() {
            let expected = last + 0.5 * (i as f64 + 1.0);
            assert!(
                (value - expected).abs() < 1e-4,
                "step {i}: expected {expected}, got {value}"
            );
        }
    }

    #[test]
    fn test_fit_predict_flat_series_stays_flat() {
        let series = series_from_closes(&[100.0; 30]);
        let prediction = OlsTrendPredictor::default().fit_predict(&series, 5).unwrap();

        for value in &prediction.predicted_close {
            assert!((value - 100.0).abs() < 1e-6);
        }
        assert!(prediction.volatility.abs() < 1e-12);
        assert_eq!(prediction.upper_bound, prediction.predicted_close);
        assert_eq!(prediction.lower_bound, prediction.predicted_close);
    }

    #[test]
    fn test_fit_predict_is_deterministic() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0)
            .collect();
        let series = series_from_closes(&closes);
        let predictor = OlsTrendPredictor::default();

        let first = predictor.fit_predict(&series, 7).unwrap();
        let second = predictor.fit_predict(&series, 7).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fit_predict_horizon_postdates_the_series() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes(&closes);
        let prediction = OlsTrendPredictor::default().fit_predict(&series, 5).unwrap();

        let last = series.last_timestamp().unwrap();
        assert_eq!(prediction.horizon.len(), 5);
        assert!(prediction.horizon.iter().all(|d| *d > last));
        assert!(prediction.horizon.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_fit_predict_clamps_steep_slopes() {
        // Slope 1 on a base near 30 implies a >3% daily move at the end of
        // the window, so the first step must be clamped.
        let closes: Vec<f64> = (0..30).map(|i| 1.0 + i as f64).collect();
        let series = series_from_closes(&closes);
        let prediction = OlsTrendPredictor::default().fit_predict(&series, 1).unwrap();

        let last = closes[closes.len() - 1];
        let first = prediction.predicted_close[0];
        assert!(first <= last * (1.0 + MAX_DAILY_MOVE) + 1e-9);
        assert!(first > last);
    }

    #[test]
    fn test_fit_predict_uses_trailing_lookback_only() {
        // 100 points, lookback 30: trained_on must cover exactly the last 30.
        let closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64 * 0.1).collect();
        let series = series_from_closes(&closes);
        let prediction = OlsTrendPredictor::default().fit_predict(&series, 2).unwrap();

        assert_eq!(prediction.trained_on.points, 30);
        assert_eq!(prediction.trained_on.end, series.last_timestamp().unwrap());
        assert_eq!(
            prediction.trained_on.start,
            series.points[series.len() - 30].timestamp
        );
    }

    #[test]
    fn test_fit_predict_zero_horizon_is_empty() {
        let series = series_from_closes(&[100.0; 30]);
        let prediction = OlsTrendPredictor::default().fit_predict(&series, 0).unwrap();
        assert!(prediction.horizon.is_empty());
        assert!(prediction.predicted_close.is_empty());
    }
}
