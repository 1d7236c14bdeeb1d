//! Fake transport for testing
//!
//! Uses fixture strings instead of real HTTP calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::engine::transport_types::{EngineError, SyncTransport};

/// Fake transport for testing (uses fixture strings)
#[derive(Debug, Clone, Default)]
pub struct FakeTransport {
    /// Response body to return from `post_json`
    pub response_body: String,
    /// Stream body to feed line-by-line from `post_stream`
    pub stream_body: String,
    /// Error message to return instead of any response (if set)
    pub error_message: Option<String>,
    /// Error message to return after all stream lines were delivered
    pub fail_after_stream: Option<String>,
    /// Lines handed to the stream callback, shared across clones
    delivered: Arc<AtomicUsize>,
}

impl FakeTransport {
    /// Create fake transport with given response body
    pub fn new(response: &str) -> Self {
        Self {
            response_body: response.to_string(),
            ..Default::default()
        }
    }

    /// Create fake transport with a streaming response
    pub fn with_stream(stream: &str) -> Self {
        Self {
            stream_body: stream.to_string(),
            ..Default::default()
        }
    }

    /// Create fake transport that fails every call with a network error
    pub fn with_error(msg: &str) -> Self {
        Self {
            error_message: Some(msg.to_string()),
            ..Default::default()
        }
    }

    /// Create fake transport that streams all lines, then raises
    ///
    /// Models a mid-stream engine failure: the caller sees every chunk
    /// before the error surfaces.
    pub fn with_stream_then_error(stream: &str, msg: &str) -> Self {
        Self {
            stream_body: stream.to_string(),
            fail_after_stream: Some(msg.to_string()),
            ..Default::default()
        }
    }

    /// Shared counter of stream lines handed to the callback
    ///
    /// Lets tests observe how far `post_stream` got before the callback
    /// declined further delivery.
    pub fn delivered_lines(&self) -> Arc<AtomicUsize> {
        self.delivered.clone()
    }
}

impl SyncTransport for FakeTransport {
    fn post_json(
        &self,
        _url: &str,
        _headers: &[(&str, &str)],
        _body: &str,
    ) -> Result<String, EngineError> {
        if let Some(ref msg) = self.error_message {
            return Err(EngineError::Network(msg.clone()));
        }
        Ok(self.response_body.clone())
    }

    fn post_stream<F>(
        &self,
        _url: &str,
        _headers: &[(&str, &str)],
        _body: &str,
        mut on_line: F,
    ) -> Result<(), EngineError>
    where
        F: FnMut(&str) -> bool,
    {
        if let Some(ref msg) = self.error_message {
            return Err(EngineError::Network(msg.clone()));
        }
        for line in self.stream_body.lines() {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            if !on_line(line) {
                return Ok(());
            }
        }
        if let Some(ref msg) = self.fail_after_stream {
            return Err(EngineError::Streaming(msg.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_transport_basic() {
        let transport = FakeTransport::new("test response");
        let result = transport.post_json("http://test", &[], "{}");
        assert_eq!(result.unwrap(), "test response");
    }

    #[test]
    fn test_fake_transport_with_error() {
        let transport = FakeTransport::with_error("test error");
        assert!(transport.post_json("http://test", &[], "{}").is_err());
        assert!(transport
            .post_stream("http://test", &[], "{}", |_| true)
            .is_err());
    }

    #[test]
    fn test_fake_transport_stream() {
        let transport = FakeTransport::with_stream("line1\nline2\nline3");
        let mut lines = Vec::new();
        let result = transport.post_stream("http://test", &[], "{}", |line| {
            lines.push(line.to_string());
            true
        });
        assert!(result.is_ok());
        assert_eq!(lines, vec!["line1", "line2", "line3"]);
    }

    #[test]
    fn test_fake_transport_stream_stops_when_callback_declines() {
        let transport = FakeTransport::with_stream("line1\nline2\nline3");
        let mut lines = Vec::new();
        let result = transport.post_stream("http://test", &[], "{}", |line| {
            lines.push(line.to_string());
            false
        });
        assert!(result.is_ok());
        assert_eq!(lines.len(), 1);
        assert_eq!(transport.delivered_lines().load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fake_transport_stream_then_error() {
        let transport = FakeTransport::with_stream_then_error("line1\nline2", "boom");
        let mut lines = Vec::new();
        let result = transport.post_stream("http://test", &[], "{}", |line| {
            lines.push(line.to_string());
            true
        });
        assert_eq!(lines.len(), 2);
        assert!(matches!(result, Err(EngineError::Streaming(_))));
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Network("test".to_string());
        assert_eq!(format!("{}", err), "Network error: test");

        let err = EngineError::Http {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(format!("{}", err), "HTTP error 404: not found");

        let err = EngineError::Configuration("missing key".to_string());
        assert!(format!("{}", err).contains("Configuration error"));
    }
}
