//! Simple and exponential moving averages.

use crate::domain::types::IndicatorColumn;

/// Arithmetic mean of the trailing `period` closes, defined from index
/// `period - 1`.
pub fn sma(closes: &[f64], period: usize) -> IndicatorColumn {
    let mut out = vec![None; closes.len()];
    if period == 0 || period > closes.len() {
        return out;
    }
    for i in (period - 1)..closes.len() {
        let window = &closes[(i + 1 - period)..=i];
        out[i] = Some(window.iter().sum::<f64>() / period as f64);
    }
    out
}

/// Recursive EMA with alpha = 2 / (period + 1), seeded at the first value.
/// Matches pandas `ewm(span=period, adjust=False)`, so the column is defined
/// from index 0.
pub fn ema(closes: &[f64], period: usize) -> IndicatorColumn {
    ema_raw(closes, period).into_iter().map(Some).collect()
}

/// EMA over a dense slice, for internal reuse (MACD builds on this).
pub(crate) fn ema_raw(values: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &value in values {
        let next = match prev {
            None => value,
            Some(prev) => alpha * value + (1.0 - alpha) * prev,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}
