//! The four stages wired together: load, transform, render, write.

use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::info;

use crate::chart::{load_logo, render, ChartPlan, ChartSpec};
use crate::config::RunConfig;
use crate::error::Result;
use crate::fetch::{load_source, HttpClient};
use crate::output::{log_summary, write_png, write_series_csv};
use crate::parser::parse_cases;
use crate::transform::{prepare, PreparedSeries, COUNTRY_ISO3, MIN_YEAR};

/// Everything computed before rasterising.
pub struct Planned {
    pub prepared: PreparedSeries,
    pub spec: ChartSpec,
    pub plan: ChartPlan,
}

#[derive(Debug)]
pub struct RunReport {
    pub output: PathBuf,
    pub size: (u32, u32),
    pub rows: usize,
    pub ticks: Vec<NaiveDate>,
}

/// Loads, parses and transforms the dataset, then lays out the chart.
#[tracing::instrument(skip_all, fields(source = %config.source))]
pub fn plan<C: HttpClient>(client: &C, config: &RunConfig) -> Result<Planned> {
    let bytes = load_source(client, &config.source_location())?;
    let table = parse_cases(&bytes)?;
    let prepared = prepare(&table, COUNTRY_ISO3, MIN_YEAR)?;

    log_summary("full_history", &prepared.full_history)?;
    log_summary("window", &prepared.window)?;

    let spec = ChartSpec::measles_uk(config.logo_path());
    let plan = ChartPlan::build(&prepared.window, &spec)?;

    Ok(Planned {
        prepared,
        spec,
        plan,
    })
}

/// Runs the whole pipeline and writes the PNG. Any stage failure aborts the run.
pub fn run<C: HttpClient>(client: &C, config: &RunConfig) -> Result<RunReport> {
    let Planned {
        prepared,
        spec,
        plan,
    } = plan(client, config)?;

    if let Some(path) = config.series_csv_path() {
        write_series_csv(&path, &prepared.window)?;
        info!(path = %path.display(), "Series CSV written");
    }

    let logo = load_logo(&spec)?;
    let chart = render(&plan, &spec, logo.as_ref())?;

    let output = config.output_path();
    let size = write_png(&chart, &output)?;

    Ok(RunReport {
        output,
        size,
        rows: prepared.window.len(),
        ticks: plan.tick_dates(),
    })
}
