//! CSV parser for the monthly measles case dataset.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::error::{ChartError, Result};

/// Columns the pipeline reads. Everything else in the file is ignored.
pub const REQUIRED_COLUMNS: &[&str] = &["iso3", "year", "month", "measles_total"];

/// One row of the source dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CaseRecord {
    pub iso3: String,
    #[serde(default)]
    pub country: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    #[serde(rename = "measles_total")]
    pub case_count: Option<u64>,
}

/// Parsed dataset: records in source order, indexed by ISO3 code.
#[derive(Debug, Default)]
pub struct CaseTable {
    records: Vec<CaseRecord>,
    by_country: HashMap<String, Vec<usize>>,
}

impl CaseTable {
    pub fn from_records(records: Vec<CaseRecord>) -> Self {
        let mut by_country: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, record) in records.iter().enumerate() {
            by_country.entry(record.iso3.clone()).or_default().push(pos);
        }
        Self {
            records,
            by_country,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CaseRecord] {
        &self.records
    }

    pub fn country_count(&self) -> usize {
        self.by_country.len()
    }

    /// Rows for `iso3` as `(source position, record)` pairs, in source order.
    pub fn rows_for<'a>(
        &'a self,
        iso3: &str,
    ) -> impl Iterator<Item = (usize, &'a CaseRecord)> + use<'a> {
        self.by_country
            .get(iso3)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&pos| (pos, &self.records[pos]))
    }
}

/// Parses CSV bytes into a [`CaseTable`].
///
/// # Errors
///
/// Returns [`ChartError::MissingColumns`] if any of [`REQUIRED_COLUMNS`] is
/// absent from the header, or [`ChartError::Parse`] if a row is malformed.
pub fn parse_cases(bytes: &[u8]) -> Result<CaseTable> {
    let mut rdr = csv::Reader::from_reader(bytes);

    let headers = rdr.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h.trim() == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ChartError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: CaseRecord = result?;
        records.push(record);
    }

    let table = CaseTable::from_records(records);
    debug!(
        rows = table.len(),
        countries = table.country_count(),
        "Parsed case table"
    );
    Ok(table)
}
