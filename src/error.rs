//! Error type shared by every pipeline stage.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid date at row {row}: year={year:?} month={month:?}")]
    Validation {
        row: usize,
        year: Option<i32>,
        month: Option<u32>,
    },

    #[error("No rows to plot: {0}")]
    EmptySeries(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("PNG encode error: {0}")]
    Encode(#[from] png::EncodingError),
}

impl ChartError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChartError::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps any drawing-backend error; plotters errors are generic over the backend.
    pub(crate) fn render(err: impl std::fmt::Display) -> Self {
        ChartError::Render(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
