use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One validated daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    /// Typical price used for volume weighting.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// One bar as delivered by a data source, before cleaning. Numeric fields may
/// be absent or unparseable; only the timestamp is guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPricePoint {
    pub timestamp: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Unvalidated fetch result for one ticker. Input to the cleaner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSeries {
    pub ticker: String,
    pub points: Vec<RawPricePoint>,
}

/// Cleaned, strictly timestamp-ordered price series for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.timestamp)
    }
}

/// Requested date range, either one of the preset lookback periods offered by
/// the UI or an explicit start/end pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    Max,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl TimeWindow {
    /// Resolves to a concrete inclusive date range, anchored at `today`.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let months_back = |n: u32| {
            today
                .checked_sub_months(Months::new(n))
                .unwrap_or(NaiveDate::MIN)
        };
        match self {
            TimeWindow::OneMonth => (months_back(1), today),
            TimeWindow::ThreeMonths => (months_back(3), today),
            TimeWindow::SixMonths => (months_back(6), today),
            TimeWindow::OneYear => (months_back(12), today),
            TimeWindow::TwoYears => (months_back(24), today),
            TimeWindow::FiveYears => (months_back(60), today),
            TimeWindow::TenYears => (months_back(120), today),
            TimeWindow::Max => (NaiveDate::MIN, today),
            TimeWindow::Custom { start, end } => (*start, *end),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeWindow::OneMonth => write!(f, "1mo"),
            TimeWindow::ThreeMonths => write!(f, "3mo"),
            TimeWindow::SixMonths => write!(f, "6mo"),
            TimeWindow::OneYear => write!(f, "1y"),
            TimeWindow::TwoYears => write!(f, "2y"),
            TimeWindow::FiveYears => write!(f, "5y"),
            TimeWindow::TenYears => write!(f, "10y"),
            TimeWindow::Max => write!(f, "max"),
            TimeWindow::Custom { start, end } => write!(f, "{start}..{end}"),
        }
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1mo" => Ok(TimeWindow::OneMonth),
            "3mo" => Ok(TimeWindow::ThreeMonths),
            "6mo" => Ok(TimeWindow::SixMonths),
            "1y" => Ok(TimeWindow::OneYear),
            "2y" => Ok(TimeWindow::TwoYears),
            "5y" => Ok(TimeWindow::FiveYears),
            "10y" => Ok(TimeWindow::TenYears),
            "max" => Ok(TimeWindow::Max),
            other => {
                let (start, end) = other
                    .split_once("..")
                    .ok_or_else(|| format!("invalid time window: {s}"))?;
                let start = NaiveDate::from_str(start)
                    .map_err(|e| format!("invalid start date {start}: {e}"))?;
                let end = NaiveDate::from_str(end)
                    .map_err(|e| format!("invalid end date {end}: {e}"))?;
                if start > end {
                    return Err(format!("start {start} is after end {end}"));
                }
                Ok(TimeWindow::Custom { start, end })
            }
        }
    }
}

/// Closed enumeration of supported indicators. Unsupported names are rejected
/// at the boundary when parsing, never deep inside computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IndicatorKind {
    Sma { period: usize },
    Ema { period: usize },
    Rsi { period: usize },
    Macd,
    Bollinger { period: usize, width: f64 },
    Vwap,
    Atr { period: usize },
    Obv,
    Stochastic { k_period: usize, d_period: usize },
    Adx { period: usize },
}

impl IndicatorKind {
    /// The indicator set the original visualizer renders by default.
    pub fn default_set() -> Vec<IndicatorKind> {
        vec![
            IndicatorKind::Sma { period: 50 },
            IndicatorKind::Sma { period: 200 },
            IndicatorKind::Rsi { period: 14 },
            IndicatorKind::Macd,
            IndicatorKind::Bollinger {
                period: 20,
                width: 2.0,
            },
            IndicatorKind::Vwap,
            IndicatorKind::Stochastic {
                k_period: 14,
                d_period: 3,
            },
            IndicatorKind::Atr { period: 14 },
            IndicatorKind::Obv,
            IndicatorKind::Adx { period: 14 },
        ]
    }

    /// Column names this kind contributes to an [`IndicatorSet`].
    pub fn column_names(&self) -> Vec<String> {
        match self {
            IndicatorKind::Sma { period } => vec![format!("SMA_{period}")],
            IndicatorKind::Ema { period } => vec![format!("EMA_{period}")],
            IndicatorKind::Rsi { period } => vec![format!("RSI_{period}")],
            IndicatorKind::Macd => vec![
                "MACD".to_string(),
                "MACD_signal".to_string(),
                "MACD_hist".to_string(),
            ],
            IndicatorKind::Bollinger { .. } => vec![
                "BB_upper".to_string(),
                "BB_middle".to_string(),
                "BB_lower".to_string(),
            ],
            IndicatorKind::Vwap => vec!["VWAP".to_string()],
            IndicatorKind::Atr { period } => vec![format!("ATR_{period}")],
            IndicatorKind::Obv => vec!["OBV".to_string()],
            IndicatorKind::Stochastic { .. } => {
                vec!["STOCH_K".to_string(), "STOCH_D".to_string()]
            }
            IndicatorKind::Adx { period } => vec![format!("ADX_{period}")],
        }
    }
}

impl FromStr for IndicatorKind {
    type Err = String;

    /// Parses CLI forms like `sma:20`, `rsi:14`, `macd`, `bb:20:2`, `stoch:14:3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let name = parts.next().unwrap_or_default().to_lowercase();
        let mut arg = |default: usize| -> Result<usize, String> {
            match parts.next() {
                Some(raw) => raw
                    .parse::<usize>()
                    .map_err(|e| format!("invalid period in {s}: {e}"))
                    .and_then(|n| {
                        if n == 0 {
                            Err(format!("period must be positive in {s}"))
                        } else {
                            Ok(n)
                        }
                    }),
                None => Ok(default),
            }
        };
        match name.as_str() {
            "sma" => Ok(IndicatorKind::Sma { period: arg(20)? }),
            "ema" => Ok(IndicatorKind::Ema { period: arg(12)? }),
            "rsi" => Ok(IndicatorKind::Rsi { period: arg(14)? }),
            "macd" => Ok(IndicatorKind::Macd),
            "bb" | "bollinger" => {
                let period = arg(20)?;
                let width = match parts.next() {
                    Some(raw) => raw
                        .parse::<f64>()
                        .map_err(|e| format!("invalid band width in {s}: {e}"))?,
                    None => 2.0,
                };
                Ok(IndicatorKind::Bollinger { period, width })
            }
            "vwap" => Ok(IndicatorKind::Vwap),
            "atr" => Ok(IndicatorKind::Atr { period: arg(14)? }),
            "obv" => Ok(IndicatorKind::Obv),
            "stoch" | "stochastic" => Ok(IndicatorKind::Stochastic {
                k_period: arg(14)?,
                d_period: arg(3)?,
            }),
            "adx" => Ok(IndicatorKind::Adx { period: arg(14)? }),
            other => Err(format!("unsupported indicator: {other}")),
        }
    }
}

/// One value per owning-series point; `None` until the lookback is satisfied.
pub type IndicatorColumn = Vec<Option<f64>>;

/// Named indicator columns, each aligned one-to-one with the owning series.
/// BTreeMap keeps column order deterministic for export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub columns: BTreeMap<String, IndicatorColumn>,
}

impl IndicatorSet {
    pub fn insert(&mut self, name: String, column: IndicatorColumn) {
        self.columns.insert(name, column);
    }

    pub fn get(&self, name: &str) -> Option<&IndicatorColumn> {
        self.columns.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.columns.keys()
    }
}

/// The series window a model was fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainedWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub points: usize,
}

/// Forward-looking close estimates with confidence framing. The bounds are
/// `predicted * (1 ± volatility)` where volatility is the sample standard
/// deviation of daily returns over the fitted window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub model_id: String,
    pub horizon: Vec<NaiveDate>,
    pub predicted_close: Vec<f64>,
    pub upper_bound: Vec<f64>,
    pub lower_bound: Vec<f64>,
    pub volatility: f64,
    pub trained_on: TrainedWindow,
}

/// The sole unit handed to the presentation layer: one cleaned series, its
/// indicator columns, and at most one prediction. Built per request, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub series: Series,
    pub indicators: IndicatorSet,
    pub prediction: Option<Prediction>,
}
