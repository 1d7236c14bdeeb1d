//! Real HTTP transport using ureq
//!
//! Synchronous blocking HTTP client for the engine.

use std::io::BufRead;

use crate::engine::transport_types::{EngineError, SyncTransport};

/// Real HTTP transport using ureq
#[derive(Debug, Clone)]
pub struct UreqTransport {
    /// Timeout in seconds for requests
    timeout: u64,
}

impl UreqTransport {
    /// Create new transport with default timeout (120s)
    ///
    /// Generation requests can legitimately take minutes; the streaming
    /// path keeps the same budget for the whole response body.
    pub fn new() -> Self {
        Self { timeout: 120 }
    }

    /// Create transport with custom timeout
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self {
            timeout: timeout_secs,
        }
    }

    fn request(&self, url: &str, headers: &[(&str, &str)]) -> ureq::Request {
        let mut request =
            ureq::request("POST", url).timeout(std::time::Duration::from_secs(self.timeout));
        for (key, value) in headers {
            request = request.set(key, value);
        }
        request
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncTransport for UreqTransport {
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, EngineError> {
        let response = self.request(url, headers).send_string(body)?;

        let mut body = String::new();
        use std::io::Read;
        response.into_reader().read_to_string(&mut body)?;
        Ok(body)
    }

    fn post_stream<F>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
        mut on_line: F,
    ) -> Result<(), EngineError>
    where
        F: FnMut(&str) -> bool,
    {
        let response = self.request(url, headers).send_string(body)?;
        tracing::debug!(status = response.status(), "engine stream opened");

        // Read response body line by line
        let mut reader = std::io::BufReader::new(response.into_reader());
        let mut line_buffer = String::new();

        loop {
            line_buffer.clear();
            let bytes_read = reader.read_line(&mut line_buffer)?;
            if bytes_read == 0 {
                break;
            }
            if !on_line(line_buffer.trim_end()) {
                tracing::debug!("engine stream consumer gone, stopping read");
                break;
            }
        }

        Ok(())
    }
}
