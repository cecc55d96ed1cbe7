//! Date derivation, filtering and projection of the case table.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ChartError, Result};
use crate::parser::{CaseRecord, CaseTable};

/// Countries retained by the pipeline.
pub const COUNTRY_ISO3: &[&str] = &["GBR"];

/// First year of the analysis window.
pub const MIN_YEAR: i32 = 2015;

/// A source row with its derived first-of-month date.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedCaseRecord {
    pub record: CaseRecord,
    pub date: NaiveDate,
}

impl DatedCaseRecord {
    /// `row` is the source position, used only for error reporting.
    pub fn new(row: usize, record: CaseRecord) -> Result<Self> {
        let date = derive_date(row, record.year, record.month)?;
        Ok(Self { record, date })
    }
}

/// Projected row: the only columns the chart needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    pub country: Option<String>,
    pub year: i32,
    pub date: NaiveDate,
    pub case_count: Option<u64>,
}

/// Ordered sequence of projected rows, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredSeries {
    pub rows: Vec<SeriesRow>,
}

impl FilteredSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.date).min()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.date).max()
    }
}

/// Output of the transformer. Only `window` is charted.
#[derive(Debug, Clone)]
pub struct PreparedSeries {
    pub full_history: FilteredSeries,
    pub window: FilteredSeries,
}

/// First day of (`year`, `month`).
pub fn derive_date(row: usize, year: Option<i32>, month: Option<u32>) -> Result<NaiveDate> {
    year.zip(month)
        .and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1))
        .ok_or(ChartError::Validation { row, year, month })
}

/// Rows whose ISO3 code is in `countries`, each dated.
///
/// Countries are emitted in the order given, each country's rows in source order.
pub fn filter_countries(table: &CaseTable, countries: &[&str]) -> Result<Vec<DatedCaseRecord>> {
    let mut out = Vec::new();
    for iso3 in countries {
        for (pos, record) in table.rows_for(iso3) {
            out.push(DatedCaseRecord::new(pos, record.clone())?);
        }
    }
    Ok(out)
}

pub fn filter_min_year(records: &[DatedCaseRecord], min_year: i32) -> Vec<DatedCaseRecord> {
    records
        .iter()
        .filter(|r| r.date.year() >= min_year)
        .cloned()
        .collect()
}

pub fn project(records: &[DatedCaseRecord]) -> FilteredSeries {
    let rows = records
        .iter()
        .map(|r| SeriesRow {
            country: r.record.country.clone(),
            year: r.date.year(),
            date: r.date,
            case_count: r.record.case_count,
        })
        .collect();
    FilteredSeries { rows }
}

/// Runs the full transformer stage.
///
/// # Errors
///
/// [`ChartError::Validation`] if a retained row has no usable year/month,
/// [`ChartError::EmptySeries`] if nothing survives the year filter.
#[tracing::instrument(skip(table), fields(rows = table.len()))]
pub fn prepare(table: &CaseTable, countries: &[&str], min_year: i32) -> Result<PreparedSeries> {
    let dated = filter_countries(table, countries)?;
    let recent = filter_min_year(&dated, min_year);

    let full_history = project(&dated);
    let window = project(&recent);

    debug!(
        full_rows = full_history.len(),
        first = ?full_history.first_date(),
        last = ?full_history.last_date(),
        "Full history series"
    );

    if window.is_empty() {
        return Err(ChartError::EmptySeries(format!(
            "no rows for {} from year {}",
            countries.join(","),
            min_year
        )));
    }

    info!(
        rows = window.len(),
        first = ?window.first_date(),
        last = ?window.last_date(),
        "Analysis window prepared"
    );

    Ok(PreparedSeries {
        full_history,
        window,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(iso3: &str, year: i32, month: u32, cases: u64) -> CaseRecord {
        CaseRecord {
            iso3: iso3.to_string(),
            country: Some(format!("{} name", iso3)),
            year: Some(year),
            month: Some(month),
            case_count: Some(cases),
        }
    }

    fn table() -> CaseTable {
        let mut rows = Vec::new();
        for year in 2013..=2016 {
            for month in 1..=12 {
                rows.push(record("GBR", year, month, (year as u64 - 2000) * 100 + month as u64));
                rows.push(record("IRL", year, month, 1));
            }
        }
        CaseTable::from_records(rows)
    }

    #[test]
    fn test_derive_date_first_of_month() {
        for month in 1..=12 {
            let date = derive_date(0, Some(2020), Some(month)).unwrap();
            assert_eq!(date, NaiveDate::from_ymd_opt(2020, month, 1).unwrap());
        }
    }

    #[test]
    fn test_derive_date_rejects_bad_month() {
        let err = derive_date(7, Some(2020), Some(13)).unwrap_err();
        assert!(matches!(
            err,
            ChartError::Validation { row: 7, year: Some(2020), month: Some(13) }
        ));
        assert!(derive_date(0, Some(2020), Some(0)).is_err());
    }

    #[test]
    fn test_derive_date_rejects_missing_fields() {
        assert!(derive_date(0, None, Some(1)).is_err());
        assert!(derive_date(0, Some(2020), None).is_err());
    }

    #[test]
    fn test_filter_countries_is_idempotent() {
        let table = table();
        let once = filter_countries(&table, &["GBR"]).unwrap();
        let again = CaseTable::from_records(once.iter().map(|r| r.record.clone()).collect());
        let twice = filter_countries(&again, &["GBR"]).unwrap();
        assert_eq!(once, twice);
        assert!(once.iter().all(|r| r.record.iso3 == "GBR"));
    }

    #[test]
    fn test_bad_date_in_other_country_is_ignored() {
        let mut rows = vec![record("GBR", 2016, 1, 3)];
        rows.push(CaseRecord {
            month: None,
            ..record("FRA", 2016, 1, 3)
        });
        let table = CaseTable::from_records(rows);
        assert_eq!(filter_countries(&table, &["GBR"]).unwrap().len(), 1);
    }

    #[test]
    fn test_bad_date_in_retained_row_fails() {
        let rows = vec![
            record("GBR", 2016, 1, 3),
            CaseRecord {
                month: Some(14),
                ..record("GBR", 2016, 1, 3)
            },
        ];
        let table = CaseTable::from_records(rows);
        let err = filter_countries(&table, &["GBR"]).unwrap_err();
        assert!(matches!(err, ChartError::Validation { row: 1, .. }));
    }

    #[test]
    fn test_window_is_subset_of_full_history() {
        let prepared = prepare(&table(), COUNTRY_ISO3, MIN_YEAR).unwrap();
        assert_eq!(prepared.full_history.len(), 48);
        assert_eq!(prepared.window.len(), 24);
        assert!(prepared.window.rows.iter().all(|r| r.year >= MIN_YEAR));
        assert!(
            prepared
                .window
                .rows
                .iter()
                .all(|r| prepared.full_history.rows.contains(r))
        );
    }

    #[test]
    fn test_project_preserves_count_and_order() {
        let dated = filter_countries(&table(), &["GBR"]).unwrap();
        let series = project(&dated);
        assert_eq!(series.len(), dated.len());
        for (row, src) in series.rows.iter().zip(&dated) {
            assert_eq!(row.date, src.date);
            assert_eq!(row.case_count, src.record.case_count);
        }
    }

    #[test]
    fn test_empty_window_is_distinct_error() {
        let err = prepare(&table(), &["GBR"], 2030).unwrap_err();
        match err {
            ChartError::EmptySeries(msg) => {
                assert!(msg.contains("GBR"));
                assert!(msg.contains("2030"));
            }
            other => panic!("expected EmptySeries, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_country_is_empty() {
        assert!(matches!(
            prepare(&table(), &["USA"], MIN_YEAR),
            Err(ChartError::EmptySeries(_))
        ));
    }
}
