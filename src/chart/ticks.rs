//! X-axis tick placement and labelling.

use chrono::{Datelike, Months, NaiveDate};

/// Tick dates from `min` to `max` inclusive, every `step_months` months.
///
/// The first tick is `min` rolled forward to the first of a month. Returns an
/// empty vector when the rolled-forward start is already past `max`.
pub fn month_start_ticks(min: NaiveDate, max: NaiveDate, step_months: u32) -> Vec<NaiveDate> {
    let step = Months::new(step_months.max(1));
    let mut ticks = Vec::new();
    let mut next = roll_to_month_start(min);
    while let Some(tick) = next.filter(|t| *t <= max) {
        ticks.push(tick);
        next = tick.checked_add_months(step);
    }
    ticks
}

fn roll_to_month_start(date: NaiveDate) -> Option<NaiveDate> {
    if date.day() == 1 {
        Some(date)
    } else {
        date.with_day(1)?.checked_add_months(Months::new(1))
    }
}

/// Formats `date` with a `chrono` pattern and splits the result into lines.
pub fn tick_label_lines(date: NaiveDate, format: &str) -> Vec<String> {
    date.format(format)
        .to_string()
        .split('\n')
        .map(str::to_string)
        .collect()
}
