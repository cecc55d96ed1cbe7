use super::client::HttpClient;
use crate::error::{ChartError, Result};
use std::time::Duration;

/// Overall request timeout. The fetch is attempted once.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct BasicClient(reqwest::blocking::Client);

impl BasicClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ChartError::Network {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self(client))
    }
}

impl HttpClient for BasicClient {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let network = |e: reqwest::Error| ChartError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let resp = self.0.get(url).send().map_err(network)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ChartError::Network {
                url: url.to_string(),
                message: format!("server returned status {}", status),
            });
        }

        Ok(resp.bytes().map_err(network)?.to_vec())
    }
}
