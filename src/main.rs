//! CLI entry point for the measles chart generator.
//!
//! A bare invocation downloads the WHO monthly measles dataset, keeps the UK
//! rows from 2015 onwards and writes `Measles_cases_uk.png`. The flags only
//! relocate inputs and outputs.

use anyhow::Result;
use clap::Parser;
use measles_chart::config::{DATA_URL, LOGO_PATH, OUTPUT_FILE, RunConfig};
use measles_chart::fetch::BasicClient;
use measles_chart::pipeline::run;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "measles_chart")]
#[command(about = "Chart monthly UK measles cases since 2015", long_about = None)]
struct Cli {
    /// URL or file to read the case CSV from
    #[arg(long, value_name = "URL_OR_FILE", default_value = DATA_URL)]
    source: String,

    /// Directory that relative paths resolve against (defaults to the crate directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = OUTPUT_FILE)]
    output: PathBuf,

    /// Logo image path
    #[arg(long, default_value = LOGO_PATH)]
    logo: PathBuf,

    /// Draw the chart without the logo
    #[arg(long, default_value_t = false)]
    no_logo: bool,

    /// Also write the plotted series to this CSV file
    #[arg(long)]
    series_csv: Option<PathBuf>,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        RunConfig {
            source: cli.source,
            base_dir: cli.base_dir.unwrap_or_else(RunConfig::default_base_dir),
            logo: (!cli.no_logo).then_some(cli.logo),
            output: cli.output,
            series_csv: cli.series_csv,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/measles_chart.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("measles_chart.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let config = RunConfig::from(Cli::parse());
    let client = BasicClient::new()?;

    let report = run(&client, &config)?;

    info!(
        output = %report.output.display(),
        width = report.size.0,
        height = report.size.1,
        rows = report.rows,
        ticks = report.ticks.len(),
        "Done"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_invocation_uses_fixed_values() {
        let config = RunConfig::from(Cli::parse_from(["measles_chart"]));
        assert_eq!(config.source, DATA_URL);
        assert_eq!(config.output, PathBuf::from(OUTPUT_FILE));
        assert_eq!(config.logo, Some(PathBuf::from(LOGO_PATH)));
        assert_eq!(config.base_dir, RunConfig::default_base_dir());
    }

    #[test]
    fn test_no_logo_flag() {
        let config = RunConfig::from(Cli::parse_from(["measles_chart", "--no-logo"]));
        assert_eq!(config.logo, None);
    }

    #[test]
    fn test_cli_verifies() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
