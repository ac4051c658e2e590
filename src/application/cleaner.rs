//! Series cleaning: ordering, de-duplication, and gap repair.
//!
//! Repairs are deliberately conservative. A single-record gap is forward
//! filled as a flat bar at the previous close; anything longer is left as a
//! break so no multi-day price history is ever fabricated.

use crate::domain::errors::AnalysisError;
use crate::domain::types::{PricePoint, RawPricePoint, RawSeries, Series};
use tracing::debug;

/// Minimum points that must survive cleaning for the series to be usable.
pub const MIN_CLEAN_POINTS: usize = 2;

/// Validates a raw fetch result into an ordered, duplicate-free series.
///
/// - Records are sorted ascending by timestamp; duplicate timestamps keep
///   the last-seen record.
/// - A record with a missing, non-finite, or non-positive close is dropped,
///   unless it is a single-record gap following a valid record, in which
///   case the previous close is carried forward as a flat bar.
/// - Missing open/high/low fall back to the record's own close; missing
///   volume carries the previous record's volume (0.0 at the start).
pub fn clean(raw: &RawSeries) -> Result<Series, AnalysisError> {
    let mut sorted: Vec<RawPricePoint> = raw.points.clone();
    // Stable sort, so records sharing a timestamp keep their input order and
    // the keep-last rule below picks the last-seen one.
    sorted.sort_by_key(|p| p.timestamp);

    let mut deduped: Vec<RawPricePoint> = Vec::with_capacity(sorted.len());
    for point in sorted {
        let duplicate = deduped
            .last()
            .is_some_and(|last| last.timestamp == point.timestamp);
        if duplicate {
            if let Some(last) = deduped.last_mut() {
                *last = point;
            }
        } else {
            deduped.push(point);
        }
    }

    let mut points: Vec<PricePoint> = Vec::with_capacity(deduped.len());
    let mut gap_run = 0usize;
    let mut dropped = 0usize;

    for record in &deduped {
        let valid_close = record.close.filter(|c| c.is_finite() && *c > 0.0);
        match valid_close {
            Some(close) => {
                let price_or_close =
                    |value: Option<f64>| value.filter(|v| v.is_finite()).unwrap_or(close);
                let volume = record
                    .volume
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .or_else(|| points.last().map(|p| p.volume))
                    .unwrap_or(0.0);
                points.push(PricePoint {
                    timestamp: record.timestamp,
                    open: price_or_close(record.open),
                    high: price_or_close(record.high),
                    low: price_or_close(record.low),
                    close,
                    volume,
                });
                gap_run = 0;
            }
            None => {
                gap_run += 1;
                let previous = points.last().copied();
                match (gap_run, previous) {
                    (1, Some(prev)) => {
                        let volume = record
                            .volume
                            .filter(|v| v.is_finite() && *v >= 0.0)
                            .unwrap_or(prev.volume);
                        points.push(PricePoint {
                            timestamp: record.timestamp,
                            open: prev.close,
                            high: prev.close,
                            low: prev.close,
                            close: prev.close,
                            volume,
                        });
                    }
                    _ => dropped += 1,
                }
            }
        }
    }

    if dropped > 0 {
        debug!(
            ticker = %raw.ticker,
            dropped,
            kept = points.len(),
            "dropped unrepairable records during cleaning"
        );
    }

    if points.len() < MIN_CLEAN_POINTS {
        return Err(AnalysisError::InsufficientData {
            required: MIN_CLEAN_POINTS,
            actual: points.len(),
        });
    }

    Ok(Series {
        ticker: raw.ticker.clone(),
        points,
    })
}
