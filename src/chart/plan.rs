//! The data-dependent part of a chart, computed before anything is drawn.

use chrono::{Datelike, NaiveDate};
use std::ops::Range;

use super::spec::{ChartSpec, Field};
use super::ticks::{month_start_ticks, tick_label_lines};
use crate::error::{ChartError, Result};
use crate::transform::{FilteredSeries, SeriesRow};

/// Fraction of the data span added on each side of an axis.
const AXIS_MARGIN: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub date: NaiveDate,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub date: NaiveDate,
    pub x: f64,
    pub label: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChartPlan {
    pub points: Vec<PlotPoint>,
    pub ticks: Vec<Tick>,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

/// Date as a continuous x coordinate (days since 0001-01-01).
pub fn date_coord(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn field_value(row: &SeriesRow, field: Field) -> Option<f64> {
    match field {
        Field::Date => Some(date_coord(row.date)),
        Field::CaseCount => row.case_count.map(|c| c as f64),
    }
}

/// Half-width used when all x values coincide.
const SINGLE_DATE_PAD_DAYS: f64 = 15.0;

/// `min..max` widened by [`AXIS_MARGIN`], or by `fallback` when the span is zero.
fn padded(min: f64, max: f64, fallback: f64) -> Range<f64> {
    let span = max - min;
    let pad = if span > 0.0 { span * AXIS_MARGIN } else { fallback };
    (min - pad)..(max + pad)
}

impl ChartPlan {
    /// Lays out `series` according to the axis bindings and tick rule in `spec`.
    ///
    /// Rows with a null y value are skipped; the remaining points are ordered
    /// by date. The x span and ticks cover every row, null or not.
    ///
    /// # Errors
    ///
    /// [`ChartError::EmptySeries`] if there is nothing to plot,
    /// [`ChartError::Render`] if the x axis is not bound to the date column.
    pub fn build(series: &FilteredSeries, spec: &ChartSpec) -> Result<Self> {
        if spec.x != Field::Date {
            return Err(ChartError::Render(format!(
                "x axis must be bound to {:?}, got {:?}",
                Field::Date,
                spec.x
            )));
        }

        let mut points: Vec<PlotPoint> = series
            .rows
            .iter()
            .filter_map(|row| {
                Some(PlotPoint {
                    date: row.date,
                    x: field_value(row, spec.x)?,
                    y: field_value(row, spec.y)?,
                })
            })
            .collect();
        points.sort_by_key(|p| p.date);

        let (Some(min_date), Some(max_date)) = (series.first_date(), series.last_date())
        else {
            return Err(ChartError::EmptySeries("no rows to plot".to_string()));
        };
        if points.is_empty() {
            return Err(ChartError::EmptySeries(format!(
                "{} rows but no plottable {:?} values",
                series.len(),
                spec.y
            )));
        }

        let ticks = month_start_ticks(min_date, max_date, spec.ticks.step_months)
            .into_iter()
            .map(|date| Tick {
                date,
                x: date_coord(date),
                label: tick_label_lines(date, spec.ticks.label_format),
            })
            .collect();

        let (y_min, y_max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });

        Ok(Self {
            x_range: padded(
                date_coord(min_date),
                date_coord(max_date),
                SINGLE_DATE_PAD_DAYS,
            ),
            y_range: padded(y_min, y_max, (y_max.abs() * AXIS_MARGIN).max(1.0)),
            points,
            ticks,
        })
    }

    pub fn y_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn tick_dates(&self) -> Vec<NaiveDate> {
        self.ticks.iter().map(|t| t.date).collect()
    }
}
