//! Run configuration: where the data comes from and where files live.

use std::path::{Path, PathBuf};

/// Monthly WHO measles and rubella counts, as republished by TidyTuesday.
pub const DATA_URL: &str = "https://raw.githubusercontent.com/rfordatascience/tidytuesday/main/data/2025/2025-06-24/cases_month.csv";

/// Logo asset, relative to the base directory.
pub const LOGO_PATH: &str = "../misc/logo-darkblue.png";

/// Output image, relative to the base directory.
pub const OUTPUT_FILE: &str = "Measles_cases_uk.png";

#[derive(Debug, Clone)]
pub struct RunConfig {
    /// `http(s)` URL or a file path.
    pub source: String,
    /// Directory that relative paths below resolve against.
    pub base_dir: PathBuf,
    pub logo: Option<PathBuf>,
    pub output: PathBuf,
    pub series_csv: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source: DATA_URL.to_string(),
            base_dir: Self::default_base_dir(),
            logo: Some(PathBuf::from(LOGO_PATH)),
            output: PathBuf::from(OUTPUT_FILE),
            series_csv: None,
        }
    }
}

impl RunConfig {
    /// The crate directory, so a bare run finds `../misc` wherever it is launched from.
    ///
    /// The tool is meant to run from its source checkout. A binary moved off the
    /// build machine falls back to the current directory.
    pub fn default_base_dir() -> PathBuf {
        base_dir_or_cwd(Path::new(env!("CARGO_MANIFEST_DIR")))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn source_location(&self) -> String {
        if self.source.starts_with("http") {
            self.source.clone()
        } else {
            self.resolve(Path::new(&self.source)).display().to_string()
        }
    }

    pub fn logo_path(&self) -> Option<PathBuf> {
        self.logo.as_deref().map(|p| self.resolve(p))
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output)
    }

    pub fn series_csv_path(&self) -> Option<PathBuf> {
        self.series_csv.as_deref().map(|p| self.resolve(p))
    }
}

fn base_dir_or_cwd(dir: &Path) -> PathBuf {
    if dir.is_dir() {
        dir.to_path_buf()
    } else {
        PathBuf::from(".")
    }
}
