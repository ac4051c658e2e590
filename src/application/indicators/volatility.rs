//! Volatility measures: Bollinger Bands and average true range.

use super::moving_average::sma;
use crate::domain::types::{IndicatorColumn, PricePoint};
use statrs::statistics::{Data, Distribution};

/// Bollinger Bands: middle = SMA(period), upper/lower = middle ± width ×
/// sample standard deviation of the window. Returns (upper, middle, lower),
/// each defined from index `period - 1`.
pub fn bollinger(
    closes: &[f64],
    period: usize,
    width: f64,
) -> (IndicatorColumn, IndicatorColumn, IndicatorColumn) {
    let len = closes.len();
    let mut upper = vec![None; len];
    let mut middle = vec![None; len];
    let mut lower = vec![None; len];
    if period == 0 || period > len {
        return (upper, middle, lower);
    }

    for i in (period - 1)..len {
        let data = Data::new(closes[(i + 1 - period)..=i].to_vec());
        let Some(mean) = data.mean() else { continue };
        let std_dev = data.std_dev().filter(|s| s.is_finite()).unwrap_or(0.0);
        middle[i] = Some(mean);
        upper[i] = Some(mean + width * std_dev);
        lower[i] = Some(mean - width * std_dev);
    }
    (upper, middle, lower)
}

/// Average true range: SMA(period) of the true range, where the first bar's
/// true range is simply high − low. Defined from index `period - 1`.
pub fn atr(points: &[PricePoint], period: usize) -> IndicatorColumn {
    let true_ranges: Vec<f64> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i == 0 {
                p.high - p.low
            } else {
                let prev_close = points[i - 1].close;
                (p.high - p.low)
                    .max((p.high - prev_close).abs())
                    .max((p.low - prev_close).abs())
            }
        })
        .collect();
    sma(&true_ranges, period)
}
