//! HTTP transport for the engine client
//!
//! Provides a synchronous HTTP client with streaming support.
//! Uses ureq for blocking I/O.

pub use crate::engine::transport_fake::FakeTransport;
pub use crate::engine::transport_types::{EngineError, SyncTransport};
pub use crate::engine::transport_ureq::UreqTransport;

/// Concrete transport enum
///
/// Wraps all transport types, avoiding dyn compatibility issues with the
/// generic streaming callback.
#[derive(Debug, Clone)]
pub enum Transport {
    Real(UreqTransport),
    Fake(FakeTransport),
}

impl SyncTransport for Transport {
    fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> Result<String, EngineError> {
        match self {
            Transport::Real(t) => t.post_json(url, headers, body),
            Transport::Fake(t) => t.post_json(url, headers, body),
        }
    }

    fn post_stream<F>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &str,
        on_line: F,
    ) -> Result<(), EngineError>
    where
        F: FnMut(&str) -> bool,
    {
        match self {
            Transport::Real(t) => t.post_stream(url, headers, body, on_line),
            Transport::Fake(t) => t.post_stream(url, headers, body, on_line),
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Transport::Real(UreqTransport::new())
    }
}
