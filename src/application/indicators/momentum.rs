//! Momentum oscillators: RSI and the stochastic oscillator.

use crate::domain::types::{IndicatorColumn, PricePoint};

/// RSI over the trailing `period`-point window (plain rolling averages of
/// the window's gains and losses, not Wilder's smoothing), defined from
/// index `period - 1`.
///
/// Degenerate windows are pinned instead of dividing by zero: no movement at
/// all is neutral (50), gains without losses saturate at 100, losses without
/// gains at 0.
pub fn rsi(closes: &[f64], period: usize) -> IndicatorColumn {
    let mut out = vec![None; closes.len()];
    if period < 2 || period > closes.len() {
        return out;
    }
    for i in (period - 1)..closes.len() {
        let window = &closes[(i + 1 - period)..=i];
        let mut gains = 0.0;
        let mut losses = 0.0;
        for pair in window.windows(2) {
            let delta = pair[1] - pair[0];
            if delta > 0.0 {
                gains += delta;
            } else {
                losses -= delta;
            }
        }
        out[i] = Some(if gains == 0.0 && losses == 0.0 {
            50.0
        } else if losses == 0.0 {
            100.0
        } else {
            let rs = gains / losses;
            100.0 - 100.0 / (1.0 + rs)
        });
    }
    out
}

/// Stochastic oscillator: %K over `k_period` highs/lows, %D as the
/// `d_period` SMA of %K. A window with no range (high == low) reads 50.
pub fn stochastic(
    points: &[PricePoint],
    k_period: usize,
    d_period: usize,
) -> (IndicatorColumn, IndicatorColumn) {
    let len = points.len();
    let mut k_col = vec![None; len];
    let mut d_col = vec![None; len];
    if k_period == 0 || d_period == 0 || k_period > len {
        return (k_col, d_col);
    }

    for i in (k_period - 1)..len {
        let window = &points[(i + 1 - k_period)..=i];
        let highest = window.iter().map(|p| p.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = window.iter().map(|p| p.low).fold(f64::INFINITY, f64::min);
        let range = highest - lowest;
        k_col[i] = Some(if range > 0.0 {
            100.0 * (points[i].close - lowest) / range
        } else {
            50.0
        });
    }

    for i in 0..len {
        if i + 1 < k_period + d_period - 1 {
            continue;
        }
        let window = &k_col[(i + 1 - d_period)..=i];
        let sum: f64 = window.iter().flatten().sum();
        if window.iter().all(|v| v.is_some()) {
            d_col[i] = Some(sum / d_period as f64);
        }
    }

    (k_col, d_col)
}
