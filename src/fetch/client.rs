use crate::error::Result;

/// Minimal blocking GET seam so the loader can be fed from something other than the network.
pub trait HttpClient {
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}
