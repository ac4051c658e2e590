//! Stooq daily-quote data source.
//!
//! Stooq serves end-of-day OHLCV history as plain CSV
//! (`/q/d/l/?s=aapl.us&d1=20240101&d2=20241231&i=d`) with no API key. US
//! tickers carry a `.us` suffix; tickers that already contain an exchange
//! suffix are passed through untouched.

use crate::domain::errors::FetchError;
use crate::domain::ports::DataSource;
use crate::domain::types::{RawPricePoint, RawSeries, TimeWindow};
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

pub struct StooqDataSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl StooqDataSource {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client for Stooq")?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    fn symbol_for(ticker: &str) -> String {
        let lower = ticker.trim().to_lowercase();
        if lower.contains('.') {
            lower
        } else {
            format!("{lower}.us")
        }
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                duration_ms: self.timeout.as_millis() as u64,
            }
        } else {
            FetchError::Transport {
                reason: err.to_string(),
            }
        }
    }
}

impl DataSource for StooqDataSource {
    fn fetch(&self, ticker: &str, window: &TimeWindow) -> Result<RawSeries, FetchError> {
        let (start, end) = window.resolve(Utc::now().date_naive());
        // Stooq's date parameters reject pre-epoch dates; "max" windows get
        // pinned to a floor it accepts.
        let floor = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(start);
        let start = start.max(floor);

        let url = format!(
            "{}/q/d/l/?s={}&d1={}&d2={}&i=d",
            self.base_url,
            Self::symbol_for(ticker),
            start.format("%Y%m%d"),
            end.format("%Y%m%d"),
        );
        debug!(ticker, %window, "fetching daily quotes from Stooq");

        let response = self.client.get(&url).send().map_err(|e| self.classify(e))?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(FetchError::NotFound {
                    ticker: ticker.to_string(),
                });
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                return Err(FetchError::RateLimited { retry_after_secs });
            }
            status if !status.is_success() => {
                return Err(FetchError::Transport {
                    reason: format!("unexpected HTTP status {status}"),
                });
            }
            _ => {}
        }

        let body = response.text().map_err(|e| self.classify(e))?;
        let points = parse_quote_csv(&body);
        if points.is_empty() {
            // Unknown symbols come back 200 with a "No data" body.
            return Err(FetchError::NotFound {
                ticker: ticker.to_string(),
            });
        }

        Ok(RawSeries {
            ticker: ticker.trim().to_uppercase(),
            points,
        })
    }
}

/// Parses a Stooq quote CSV body. Rows without a parseable date are skipped;
/// unparseable numeric fields become `None` and are left for the cleaner.
fn parse_quote_csv(body: &str) -> Vec<RawPricePoint> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut points = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let Some(timestamp) = record.get(0).and_then(|s| NaiveDate::from_str(s.trim()).ok())
        else {
            continue;
        };
        let field = |i: usize| record.get(i).and_then(|s| s.trim().parse::<f64>().ok());
        points.push(RawPricePoint {
            timestamp,
            open: field(1),
            high: field(2),
            low: field(3),
            close: field(4),
            volume: field(5),
        });
    }
    points
}
