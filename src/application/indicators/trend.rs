//! Trend strength: average directional index.

use crate::domain::types::{IndicatorColumn, PricePoint};

/// ADX(period) with plain rolling-mean smoothing throughout (the same
/// smoothing convention the rest of the engine uses, not Wilder's).
///
/// Directional movement uses the dominant-move rule: a bar contributes +DM
/// only when its upward move exceeds its downward move, and vice versa. The
/// DIs are rolling means of DM over rolling means of true range; DX is the
/// normalized DI spread; ADX is the rolling mean of DX. First defined index
/// is `2 * period - 1`.
pub fn adx(points: &[PricePoint], period: usize) -> IndicatorColumn {
    let len = points.len();
    let mut out = vec![None; len];
    if period == 0 || len < 2 * period {
        return out;
    }

    // Index 0 holds a placeholder; directional movement needs a prior bar.
    let mut plus_dm = vec![0.0; len];
    let mut minus_dm = vec![0.0; len];
    let mut true_range = vec![0.0; len];
    for i in 1..len {
        let up = points[i].high - points[i - 1].high;
        let down = points[i - 1].low - points[i].low;
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
        let prev_close = points[i - 1].close;
        true_range[i] = (points[i].high - points[i].low)
            .max((points[i].high - prev_close).abs())
            .max((points[i].low - prev_close).abs());
    }

    // DI and DX, defined from index `period` so every window stays clear of
    // the placeholder at index 0.
    let mut dx = vec![None; len];
    let mean = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;
    for i in period..len {
        let window = (i + 1 - period)..=i;
        let tr_mean = mean(&true_range[window.clone()]);
        if tr_mean <= 0.0 {
            continue;
        }
        let plus_di = 100.0 * mean(&plus_dm[window.clone()]) / tr_mean;
        let minus_di = 100.0 * mean(&minus_dm[window]) / tr_mean;
        let di_sum = plus_di + minus_di;
        if di_sum > 0.0 {
            dx[i] = Some(100.0 * (plus_di - minus_di).abs() / di_sum);
        }
    }

    for i in (2 * period - 1)..len {
        let window = &dx[(i + 1 - period)..=i];
        if window.iter().all(|v| v.is_some()) {
            let sum: f64 = window.iter().flatten().sum();
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u64, high: f64, low: f64, close: f64) -> PricePoint {
        PricePoint {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(day),
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn test_adx_strong_uptrend_reads_high() {
        // Highs and lows both climb every bar: all movement is +DM, so the
        // DI spread is total and DX pins at 100.
        let points: Vec<PricePoint> = (0..40)
            .map(|d| {
                let base = 100.0 + d as f64;
                bar(d, base + 1.0, base - 1.0, base)
            })
            .collect();
        let column = adx(&points, 14);
        assert!(column[26].is_none());
        let last = column.last().unwrap().unwrap();
        assert!((last - 100.0).abs() < 1e-9, "got {last}");
    }

    #[test]
    fn test_adx_definedness_boundary() {
        let points: Vec<PricePoint> = (0..40)
            .map(|d| {
                let base = 100.0 + (d as f64 * 0.8).sin() * 3.0;
                bar(d, base + 1.0, base - 1.0, base)
            })
            .collect();
        let column = adx(&points, 14);
        for (i, value) in column.iter().enumerate() {
            if i < 27 {
                assert!(value.is_none(), "index {i} should be undefined");
            }
        }
        assert!(column[27].is_some());
    }

    #[test]
    fn test_adx_stays_in_bounds() {
        let points: Vec<PricePoint> = (0..60)
            .map(|d| {
                let base = 100.0 + (d as f64 * 0.5).cos() * 4.0;
                bar(d, base + 2.0, base - 2.0, base)
            })
            .collect();
        for value in adx(&points, 14).iter().flatten() {
            assert!((0.0..=100.0).contains(value));
        }
    }

    #[test]
    fn test_adx_short_series_is_all_undefined() {
        let points: Vec<PricePoint> = (0..20)
            .map(|d| bar(d, 101.0, 99.0, 100.0))
            .collect();
        assert!(adx(&points, 14).iter().all(|v| v.is_none()));
    }
}
