//! Final aggregation into the presentation contract.
//!
//! Pure bookkeeping: the only way this fails is a length or ordering
//! mismatch between upstream stages, which signals an internal bug. Such
//! violations are logged and the request fails closed; a partial or
//! inconsistent [`AnalysisResult`] is never returned.

use crate::domain::errors::AnalysisError;
use crate::domain::types::{AnalysisResult, IndicatorSet, Prediction, Series};
use tracing::error;

/// Merges the cleaned series, its indicator columns, and an optional
/// prediction into one [`AnalysisResult`].
pub fn assemble(
    series: Series,
    indicators: IndicatorSet,
    prediction: Option<Prediction>,
) -> Result<AnalysisResult, AnalysisError> {
    let expected = series.len();
    for (name, column) in &indicators.columns {
        if column.len() != expected {
            let err = AnalysisError::Alignment {
                column: name.clone(),
                len: column.len(),
                expected,
            };
            error!(ticker = %series.ticker, %err, "indicator column misaligned");
            return Err(err);
        }
    }

    if let Some(prediction) = &prediction {
        let horizon_len = prediction.horizon.len();
        for (name, len) in [
            ("prediction.predicted_close", prediction.predicted_close.len()),
            ("prediction.upper_bound", prediction.upper_bound.len()),
            ("prediction.lower_bound", prediction.lower_bound.len()),
        ] {
            if len != horizon_len {
                let err = AnalysisError::Alignment {
                    column: name.to_string(),
                    len,
                    expected: horizon_len,
                };
                error!(ticker = %series.ticker, %err, "prediction vectors misaligned");
                return Err(err);
            }
        }

        if let Some(last) = series.last_timestamp() {
            let leaked = prediction.horizon.iter().filter(|d| **d <= last).count();
            if leaked > 0 {
                let err = AnalysisError::Alignment {
                    column: "prediction.horizon".to_string(),
                    len: leaked,
                    expected: 0,
                };
                error!(
                    ticker = %series.ticker,
                    leaked,
                    "prediction horizon overlaps the fitted series"
                );
                return Err(err);
            }
        }
    }

    Ok(AnalysisResult {
        series,
        indicators,
        prediction,
    })
}
