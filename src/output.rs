//! Persistence of the rendered chart and the plotted series.
//!
//! Supports PNG export with a tightened bounding box, CSV export of the
//! series, and log summaries.

use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::chart::RenderedChart;
use crate::error::{ChartError, Result};
use crate::transform::FilteredSeries;

const METERS_PER_INCH: f64 = 0.0254;

/// Headline numbers for a series, logged after each run.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct SeriesSummary {
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub total_cases: u64,
    pub peak_cases: Option<u64>,
    pub peak_date: Option<NaiveDate>,
    pub missing_counts: usize,
}

pub fn series_summary(series: &FilteredSeries) -> SeriesSummary {
    let peak = series
        .rows
        .iter()
        .filter_map(|r| r.case_count.map(|c| (c, r.date)))
        .max_by_key(|(c, _)| *c);

    SeriesSummary {
        rows: series.len(),
        first_date: series.first_date(),
        last_date: series.last_date(),
        total_cases: series.rows.iter().filter_map(|r| r.case_count).sum(),
        peak_cases: peak.map(|(c, _)| c),
        peak_date: peak.map(|(_, d)| d),
        missing_counts: series.rows.iter().filter(|r| r.case_count.is_none()).count(),
    }
}

/// Logs a series summary: headline fields at info, full JSON at debug.
pub fn log_summary(label: &str, series: &FilteredSeries) -> Result<SeriesSummary> {
    let summary = series_summary(series);
    info!(
        series = label,
        rows = summary.rows,
        total_cases = summary.total_cases,
        peak_cases = ?summary.peak_cases,
        peak_date = ?summary.peak_date,
        "Series summary"
    );
    debug!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(summary)
}

/// Writes the series rows to a CSV file with a header, replacing any existing file.
pub fn write_series_csv(path: &Path, series: &FilteredSeries) -> Result<()> {
    debug!(path = %path.display(), rows = series.len(), "Writing series CSV");

    let file = File::create(path).map_err(|e| ChartError::io(path, e))?;
    write_series_rows(file, path, series)
}

/// Serialises `series` into `out`. Every failure is reported against `path`.
fn write_series_rows<W: Write>(out: W, path: &Path, series: &FilteredSeries) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(out);

    for row in &series.rows {
        writer
            .serialize(row)
            .map_err(|e| csv_write_error(path, e))?;
    }
    writer.flush().map_err(|e| ChartError::io(path, e))?;

    Ok(())
}

fn csv_write_error(path: &Path, err: csv::Error) -> ChartError {
    let source = match err.into_kind() {
        csv::ErrorKind::Io(source) => source,
        other => io::Error::other(format!("{:?}", other)),
    };
    ChartError::io(path, source)
}

/// Smallest `(x0, y0, x1, y1)` box (exclusive ends) holding every pixel that
/// differs from the background, or `None` for a blank image.
pub fn content_bounds(chart: &RenderedChart) -> Option<(u32, u32, u32, u32)> {
    let bg = [chart.background.0, chart.background.1, chart.background.2];
    let mut bounds: Option<(u32, u32, u32, u32)> = None;

    for (i, px) in chart.pixels.chunks_exact(3).enumerate() {
        if px == bg {
            continue;
        }
        let x = (i % chart.width as usize) as u32;
        let y = (i / chart.width as usize) as u32;
        bounds = Some(match bounds {
            None => (x, y, x + 1, y + 1),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x + 1), y1.max(y + 1)),
        });
    }

    bounds
}

/// The content bounds grown by the chart's padding and clamped to the canvas.
pub fn tight_bounds(chart: &RenderedChart) -> (u32, u32, u32, u32) {
    match content_bounds(chart) {
        Some((x0, y0, x1, y1)) => (
            x0.saturating_sub(chart.pad_px),
            y0.saturating_sub(chart.pad_px),
            (x1 + chart.pad_px).min(chart.width),
            (y1 + chart.pad_px).min(chart.height),
        ),
        None => (0, 0, chart.width, chart.height),
    }
}

fn crop(chart: &RenderedChart, (x0, y0, x1, y1): (u32, u32, u32, u32)) -> Vec<u8> {
    let stride = chart.width as usize * 3;
    let mut out = Vec::with_capacity((x1 - x0) as usize * (y1 - y0) as usize * 3);
    for y in y0..y1 {
        let start = y as usize * stride + x0 as usize * 3;
        let end = y as usize * stride + x1 as usize * 3;
        out.extend_from_slice(&chart.pixels[start..end]);
    }
    out
}

/// Encodes `chart` as PNG, cropped to its content, with the DPI recorded in
/// the file. Overwrites `path`. Returns the written pixel size.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn write_png(chart: &RenderedChart, path: &Path) -> Result<(u32, u32)> {
    let bounds = tight_bounds(chart);
    let (width, height) = (bounds.2 - bounds.0, bounds.3 - bounds.1);
    let data = crop(chart, bounds);

    let ppm = (chart.dpi as f64 / METERS_PER_INCH).round() as u32;
    let mut encoded = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut encoded, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&data)?;
        writer.finish()?;
    }

    std::fs::write(path, &encoded).map_err(|e| ChartError::io(path, e))?;
    info!(width, height, bytes = encoded.len(), "Chart written");
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::SeriesRow;
    use plotters::style::RGBColor;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    fn blank(width: u32, height: u32, pad_px: u32) -> RenderedChart {
        RenderedChart {
            width,
            height,
            dpi: 300,
            background: RGBColor(255, 255, 255),
            pad_px,
            pixels: vec![255; (width * height * 3) as usize],
        }
    }

    fn paint(chart: &mut RenderedChart, x: u32, y: u32) {
        let i = ((y * chart.width + x) * 3) as usize;
        chart.pixels[i..i + 3].copy_from_slice(&[0, 0, 0]);
    }

    fn series() -> FilteredSeries {
        let rows = [(1, Some(10)), (2, None), (3, Some(25)), (4, Some(5))]
            .into_iter()
            .map(|(m, c)| SeriesRow {
                country: Some("United Kingdom".to_string()),
                year: 2020,
                date: NaiveDate::from_ymd_opt(2020, m, 1).unwrap(),
                case_count: c,
            })
            .collect();
        FilteredSeries { rows }
    }

    #[test]
    fn test_summary_counts() {
        let summary = series_summary(&series());
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.total_cases, 40);
        assert_eq!(summary.peak_cases, Some(25));
        assert_eq!(summary.peak_date, NaiveDate::from_ymd_opt(2020, 3, 1));
        assert_eq!(summary.missing_counts, 1);
    }

    #[test]
    fn test_log_summary_does_not_panic() {
        log_summary("window", &series()).unwrap();
        log_summary("empty", &FilteredSeries::default()).unwrap();
    }

    #[test]
    fn test_series_csv_has_header_and_rows() {
        let path = temp_path("measles_chart_series.csv");
        let _ = fs::remove_file(&path);

        write_series_csv(&path, &series()).unwrap();
        write_series_csv(&path, &series()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "country,year,date,case_count");
        assert_eq!(lines[1], "United Kingdom,2020,2020-01-01,10");
        assert_eq!(lines[2], "United Kingdom,2020,2020-02-01,");

        fs::remove_file(&path).unwrap();
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_series_csv_write_failure_is_io_error() {
        let rows = series().rows;
        let long = FilteredSeries {
            rows: rows.iter().cycle().take(2000).cloned().collect(),
        };
        let path = Path::new("series.csv");
        match write_series_rows(BrokenPipe, path, &long) {
            Err(ChartError::Io { path: p, source }) => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_content_bounds_of_blank_is_none() {
        assert_eq!(content_bounds(&blank(10, 10, 0)), None);
        assert_eq!(tight_bounds(&blank(10, 10, 2)), (0, 0, 10, 10));
    }

    #[test]
    fn test_tight_bounds_pads_and_clamps() {
        let mut chart = blank(20, 10, 3);
        paint(&mut chart, 5, 4);
        paint(&mut chart, 18, 6);
        assert_eq!(content_bounds(&chart), Some((5, 4, 19, 7)));
        assert_eq!(tight_bounds(&chart), (2, 1, 20, 10));
    }

    #[test]
    fn test_write_png_crops_and_overwrites() {
        let path = temp_path("measles_chart_crop.png");
        fs::write(&path, b"stale").unwrap();

        let mut chart = blank(40, 30, 1);
        paint(&mut chart, 10, 10);
        paint(&mut chart, 19, 14);

        let size = write_png(&chart, &path).unwrap();
        assert_eq!(size, (12, 7));

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 7));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_png_unwritable_path_is_io_error() {
        let chart = blank(4, 4, 0);
        let result = write_png(&chart, Path::new("/nonexistent/dir/chart.png"));
        assert!(matches!(result, Err(ChartError::Io { .. })));
    }
}
