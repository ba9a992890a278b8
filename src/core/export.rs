use crate::domain::model::{DisplayFrame, LineSeries};
use crate::utils::error::{ForecastError, Result};
use serde::Serialize;

const CHART_HEIGHT: usize = 12;
const CHART_MAX_WIDTH: usize = 72;

#[derive(Debug, Serialize)]
struct ExportRow {
    ds: String,
    yhat: f64,
}

/// `ds,yhat` CSV for the trailing `days` rows, no index column.
pub fn to_csv(display: &DisplayFrame, days: usize) -> Result<String> {
    let skip = display.rows.len().saturating_sub(days);
    let mut writer = csv::Writer::from_writer(Vec::new());

    for row in display.rows.iter().skip(skip) {
        writer.serialize(ExportRow {
            ds: row.ds.format("%Y-%m-%d").to_string(),
            yhat: row.yhat,
        })?;
    }

    // 沒有資料列時 serialize 不會寫出標頭
    if display.rows.len() == skip {
        writer.write_record(["ds", "yhat"])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ForecastError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ForecastError::ValidationError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

/// File name offered for download, e.g. `Tesla_Stock_Forecast_30d.csv`.
pub fn export_filename(subject: &str, days: usize) -> String {
    let safe: String = subject
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = if safe.is_empty() { "Forecast".to_string() } else { safe };
    format!("{}_Forecast_{}d.csv", safe, days)
}

pub fn line_series(display: &DisplayFrame) -> LineSeries {
    LineSeries {
        name: "yhat".to_string(),
        points: display.rows.iter().map(|r| (r.ds, r.yhat)).collect(),
    }
}

/// Plain-text line chart of a series, one column per sampled point.
pub fn render_chart(series: &LineSeries) -> String {
    if series.points.is_empty() {
        return format!("{}: (no data)\n", series.name);
    }

    let width = series.points.len().min(CHART_MAX_WIDTH);
    let sampled: Vec<f64> = (0..width)
        .map(|col| {
            let idx = if width == 1 {
                0
            } else {
                col * (series.points.len() - 1) / (width - 1)
            };
            series.points[idx].1
        })
        .collect();

    let min = sampled.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = sampled.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = if max > min { max - min } else { 1.0 };

    let level = |v: f64| -> usize {
        let scaled = ((v - min) / span * (CHART_HEIGHT - 1) as f64).round() as usize;
        scaled.min(CHART_HEIGHT - 1)
    };

    let mut grid = vec![vec![' '; width]; CHART_HEIGHT];
    for (col, &v) in sampled.iter().enumerate() {
        grid[CHART_HEIGHT - 1 - level(v)][col] = '*';
    }

    let mut out = String::new();
    for (i, line) in grid.iter().enumerate() {
        let label = if i == 0 {
            format!("{:>12.2}", max)
        } else if i == CHART_HEIGHT - 1 {
            format!("{:>12.2}", min)
        } else {
            " ".repeat(12)
        };
        out.push_str(&label);
        out.push_str(" |");
        out.extend(line.iter());
        out.push('\n');
    }
    out.push_str(&" ".repeat(13));
    out.push('+');
    out.push_str(&"-".repeat(width));
    out.push('\n');

    let first = series.points[0].0.format("%Y-%m-%d").to_string();
    let last = series.points[series.points.len() - 1]
        .0
        .format("%Y-%m-%d")
        .to_string();
    out.push_str(&format!("{}{}  ..  {}\n", " ".repeat(14), first, last));
    out
}
