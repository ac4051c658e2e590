//! Volume-derived series: VWAP and on-balance volume.

use crate::domain::types::{IndicatorColumn, PricePoint};

/// Volume-weighted average price, cumulative over the whole series. Daily
/// bars carry no session boundaries, so there is no per-session reset.
/// Positions where the cumulative volume is still zero are undefined.
pub fn vwap(points: &[PricePoint]) -> IndicatorColumn {
    let mut out = Vec::with_capacity(points.len());
    let mut cumulative_pv = 0.0;
    let mut cumulative_volume = 0.0;
    for point in points {
        cumulative_pv += point.typical_price() * point.volume;
        cumulative_volume += point.volume;
        out.push(if cumulative_volume > 0.0 {
            Some(cumulative_pv / cumulative_volume)
        } else {
            None
        });
    }
    out
}

/// On-balance volume: signed cumulative volume, adding on up-closes and
/// subtracting on down-closes. Flat closes carry the running total. Starts
/// at 0 on the first bar.
pub fn obv(points: &[PricePoint]) -> IndicatorColumn {
    let mut out = Vec::with_capacity(points.len());
    let mut running = 0.0;
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            let prev_close = points[i - 1].close;
            if point.close > prev_close {
                running += point.volume;
            } else if point.close < prev_close {
                running -= point.volume;
            }
        }
        out.push(Some(running));
    }
    out
}
