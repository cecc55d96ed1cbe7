//! Retrieval of the raw dataset bytes.

mod basic;
mod client;

pub use basic::{BasicClient, CONNECT_TIMEOUT, REQUEST_TIMEOUT};
pub use client::HttpClient;

use crate::error::{ChartError, Result};
use tracing::{debug, info};

/// Loads the dataset from an `http(s)` URL through `client`, or from a local file path.
#[tracing::instrument(skip(client))]
pub fn load_source<C: HttpClient>(client: &C, source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        info!("Fetching dataset");
        client.get(source)?
    } else {
        info!("Reading dataset from disk");
        std::fs::read(source).map_err(|e| ChartError::io(source, e))?
    };
    debug!(bytes = bytes.len(), "Dataset loaded");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::env;
    use std::fs;

    struct CountingClient {
        calls: Cell<usize>,
    }

    impl HttpClient for CountingClient {
        fn get(&self, _url: &str) -> Result<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            Ok(b"iso3,year,month,measles_total\n".to_vec())
        }
    }

    struct FailingClient;

    impl HttpClient for FailingClient {
        fn get(&self, url: &str) -> Result<Vec<u8>> {
            Err(ChartError::Network {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    #[test]
    fn test_url_source_uses_client_once() {
        let client = CountingClient { calls: Cell::new(0) };
        let bytes = load_source(&client, "https://example.invalid/cases.csv").unwrap();
        assert_eq!(client.calls.get(), 1);
        assert!(bytes.starts_with(b"iso3"));
    }

    #[test]
    fn test_network_failure_is_not_retried() {
        let result = load_source(&FailingClient, "http://example.invalid/cases.csv");
        assert!(matches!(result, Err(ChartError::Network { .. })));
    }

    #[test]
    fn test_file_source_bypasses_client() {
        let path = format!("{}/measles_chart_fetch_source.csv", env::temp_dir().display());
        fs::write(&path, "iso3,year\n").unwrap();

        let client = CountingClient { calls: Cell::new(0) };
        let bytes = load_source(&client, &path).unwrap();

        assert_eq!(client.calls.get(), 0);
        assert_eq!(bytes, b"iso3,year\n");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let client = CountingClient { calls: Cell::new(0) };
        let result = load_source(&client, "/nonexistent/measles_chart/cases.csv");
        assert!(matches!(result, Err(ChartError::Io { .. })));
    }
}
