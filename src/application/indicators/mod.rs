//! Indicator engine: deterministic trailing-window derivations over a
//! cleaned series.
//!
//! Every computed column is aligned one-to-one with the owning series, with
//! `None` at positions where the indicator's lookback is not yet satisfied.
//! An indicator whose lookback exceeds the series length yields an all-`None`
//! column, never an error; rendering gaps is the caller's concern.

pub mod macd;
pub mod momentum;
pub mod moving_average;
pub mod trend;
pub mod volatility;
pub mod volume;

use crate::domain::types::{IndicatorKind, IndicatorSet, Series};
use tracing::debug;

/// Computes the selected indicators over `series`. Duplicate selections
/// collapse onto the same named column.
pub fn compute(series: &Series, selected: &[IndicatorKind]) -> IndicatorSet {
    let closes = series.closes();
    let mut set = IndicatorSet::default();

    for kind in selected {
        match *kind {
            IndicatorKind::Sma { period } => {
                set.insert(format!("SMA_{period}"), moving_average::sma(&closes, period));
            }
            IndicatorKind::Ema { period } => {
                set.insert(format!("EMA_{period}"), moving_average::ema(&closes, period));
            }
            IndicatorKind::Rsi { period } => {
                set.insert(format!("RSI_{period}"), momentum::rsi(&closes, period));
            }
            IndicatorKind::Macd => {
                let (line, signal, hist) = macd::macd(&closes);
                set.insert("MACD".to_string(), line);
                set.insert("MACD_signal".to_string(), signal);
                set.insert("MACD_hist".to_string(), hist);
            }
            IndicatorKind::Bollinger { period, width } => {
                let (upper, middle, lower) = volatility::bollinger(&closes, period, width);
                set.insert("BB_upper".to_string(), upper);
                set.insert("BB_middle".to_string(), middle);
                set.insert("BB_lower".to_string(), lower);
            }
            IndicatorKind::Vwap => {
                set.insert("VWAP".to_string(), volume::vwap(&series.points));
            }
            IndicatorKind::Atr { period } => {
                set.insert(
                    format!("ATR_{period}"),
                    volatility::atr(&series.points, period),
                );
            }
            IndicatorKind::Obv => {
                set.insert("OBV".to_string(), volume::obv(&series.points));
            }
            IndicatorKind::Stochastic { k_period, d_period } => {
                let (k, d) = momentum::stochastic(&series.points, k_period, d_period);
                set.insert("STOCH_K".to_string(), k);
                set.insert("STOCH_D".to_string(), d);
            }
            IndicatorKind::Adx { period } => {
                set.insert(format!("ADX_{period}"), trend::adx(&series.points, period));
            }
        }
    }

    debug!(
        ticker = %series.ticker,
        columns = set.columns.len(),
        points = series.len(),
        "computed indicator set"
    );
    set
}
