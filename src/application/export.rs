//! Flat CSV export of an [`AnalysisResult`].
//!
//! A derived flattening for download, not a versioned format: base OHLCV
//! columns followed by the indicator columns in their map order, one row per
//! series point. Undefined indicator cells render empty.

use crate::domain::types::AnalysisResult;
use std::io::Write;

pub fn write_csv<W: Write>(result: &AnalysisResult, writer: W) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = vec![
        "timestamp".to_string(),
        "open".to_string(),
        "high".to_string(),
        "low".to_string(),
        "close".to_string(),
        "volume".to_string(),
    ];
    header.extend(result.indicators.names().cloned());
    out.write_record(&header)?;

    for (i, point) in result.series.points.iter().enumerate() {
        let mut row = vec![
            point.timestamp.to_string(),
            point.open.to_string(),
            point.high.to_string(),
            point.low.to_string(),
            point.close.to_string(),
            point.volume.to_string(),
        ];
        for column in result.indicators.columns.values() {
            row.push(
                column
                    .get(i)
                    .copied()
                    .flatten()
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        out.write_record(&row)?;
    }

    out.flush()?;
    Ok(())
}
