//! Moving-average convergence/divergence with the standard 12/26/9 periods.

use super::moving_average::ema_raw;
use crate::domain::types::IndicatorColumn;

pub const FAST_PERIOD: usize = 12;
pub const SLOW_PERIOD: usize = 26;
pub const SIGNAL_PERIOD: usize = 9;

/// Returns (MACD line, signal line, histogram). Under the recursive EMA
/// convention all three are defined from index 0.
pub fn macd(closes: &[f64]) -> (IndicatorColumn, IndicatorColumn, IndicatorColumn) {
    let fast = ema_raw(closes, FAST_PERIOD);
    let slow = ema_raw(closes, SLOW_PERIOD);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_raw(&line, SIGNAL_PERIOD);
    let hist: Vec<f64> = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    (
        line.into_iter().map(Some).collect(),
        signal.into_iter().map(Some).collect(),
        hist.into_iter().map(Some).collect(),
    )
}
