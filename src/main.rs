use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;
use stockscope::application::export;
use stockscope::application::pipeline::{AnalysisPipeline, AnalysisRequest};
use stockscope::application::predictor::OlsTrendPredictor;
use stockscope::config::AppConfig;
use stockscope::domain::types::{AnalysisResult, IndicatorKind, TimeWindow};
use stockscope::infrastructure::cache::FetchCache;
use stockscope::infrastructure::stooq::StooqDataSource;

/// Technical-indicator analysis and trend extrapolation for a stock ticker.
#[derive(Parser, Debug)]
#[command(name = "stockscope", version)]
struct Cli {
    /// Ticker symbol, e.g. AAPL
    ticker: String,

    /// Lookback window: 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, max, or
    /// START..END dates (e.g. 2024-01-01..2024-06-30)
    #[arg(long, default_value = "1y")]
    window: TimeWindow,

    /// Comma-separated indicator selection, e.g. sma:50,rsi:14,macd,bb:20:2.
    /// Defaults to the standard set when omitted.
    #[arg(long, value_delimiter = ',')]
    indicators: Vec<IndicatorKind>,

    /// Prediction horizon in days; 0 disables the prediction stage
    #[arg(long, default_value_t = 7)]
    horizon: usize,

    /// Write the flattened result to a CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the full result contract as JSON instead of a summary
    #[arg(long)]
    json: bool,

    /// Disable the in-process fetch cache
    #[arg(long)]
    no_cache: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let source = StooqDataSource::new(
        config.stooq_base_url.clone(),
        Duration::from_secs(config.fetch_timeout_secs),
    )?;
    let model = OlsTrendPredictor::new(config.prediction_lookback, config.min_fit_points);

    let mut pipeline = AnalysisPipeline::new(source, model);
    if !cli.no_cache {
        pipeline = pipeline.with_cache(FetchCache::new(Duration::from_secs(config.cache_ttl_secs)));
    }

    let indicators = if cli.indicators.is_empty() {
        IndicatorKind::default_set()
    } else {
        cli.indicators.clone()
    };
    let request = AnalysisRequest {
        ticker: cli.ticker.trim().to_uppercase(),
        window: cli.window,
        indicators,
        horizon_days: cli.horizon,
    };

    let result = pipeline.run(&request)?;

    if let Some(path) = &cli.csv {
        let file = File::create(path)
            .with_context(|| format!("creating CSV file {}", path.display()))?;
        export::write_csv(&result, file)
            .with_context(|| format!("writing CSV to {}", path.display()))?;
        println!("wrote {} rows to {}", result.series.len(), path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn print_summary(result: &AnalysisResult) {
    let series = &result.series;
    println!(
        "{}: {} points ({} .. {})",
        series.ticker,
        series.len(),
        series.points.first().map(|p| p.timestamp.to_string()).unwrap_or_default(),
        series.points.last().map(|p| p.timestamp.to_string()).unwrap_or_default(),
    );
    if let Some(last) = series.points.last() {
        println!("last close: {:.2}  (volume {:.0})", last.close, last.volume);
    }

    if !result.indicators.columns.is_empty() {
        println!("\nindicators (latest defined value):");
        for (name, column) in &result.indicators.columns {
            match column.iter().rev().flatten().next() {
                Some(value) => println!("  {name:<12} {value:.4}"),
                None => println!("  {name:<12} -"),
            }
        }
    }

    if let Some(prediction) = &result.prediction {
        println!(
            "\nprediction ({}, fitted on {} points {} .. {}, volatility {:.4}):",
            prediction.model_id,
            prediction.trained_on.points,
            prediction.trained_on.start,
            prediction.trained_on.end,
            prediction.volatility,
        );
        for i in 0..prediction.horizon.len() {
            println!(
                "  {}  {:>10.2}  [{:.2} .. {:.2}]",
                prediction.horizon[i],
                prediction.predicted_close[i],
                prediction.lower_bound[i],
                prediction.upper_bound[i],
            );
        }
        println!("  trend extrapolation only, not a forecast guarantee");
    }
}
