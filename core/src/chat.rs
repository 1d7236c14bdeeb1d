//! Chat adapters
//!
//! `ChatService` drives the engine client in both delivery modes:
//!
//! - non-streaming: one blocking engine call, one `AggregateResponse`,
//!   engine errors propagate to the caller;
//! - streaming: the blocking incremental call runs on a dedicated blocking
//!   task and pushes a typed event union through a bounded channel.
//!   `FragmentStream` turns that union into an ordered fragment sequence
//!   that ends with exactly one terminal fragment, even on mid-stream
//!   failure — termination is a value here, never a thrown fault.
//!
//! Engine construction is guarded by a memoized one-time init: the first
//! caller performs it, concurrent callers wait on the cell, and a missing
//! credential fails it permanently with a configuration error.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::engine::{ChatTurn, EngineError, GeminiEngine, GenerationParams};
use crate::normalize::{collapse_parts, fragment_from_chunk, AggregateResponse, StreamFragment};

/// Fragments buffered between the blocking driver and the consumer
const STREAM_CHANNEL_CAPACITY: usize = 32;

/// Engine configuration resolved from settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// API key (empty means not configured)
    pub api_key: String,
    /// Model identifier
    pub model_id: String,
    /// API base URL
    pub base_url: String,
}

/// Internal streaming event union
///
/// Pushed through the channel by the blocking driver; `Done` and `Failed`
/// are terminal.
#[derive(Debug)]
pub enum StreamEvent {
    /// One normalized non-final fragment
    Fragment(StreamFragment),
    /// Engine signalled end-of-stream with no error
    Done,
    /// Engine raised during submission or iteration
    Failed(EngineError),
}

/// Chat service shared across all requests
pub struct ChatService {
    /// Engine configuration
    config: EngineConfig,
    /// Memoized engine handle, read-only once initialized
    engine: OnceCell<Arc<GeminiEngine>>,
}

impl ChatService {
    /// Create service; the engine is initialized lazily on first use
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            engine: OnceCell::new(),
        }
    }

    /// Create service with a pre-built engine (for testing)
    pub fn with_engine(config: EngineConfig, engine: GeminiEngine) -> Self {
        Self {
            config,
            engine: OnceCell::new_with(Some(Arc::new(engine))),
        }
    }

    /// One-time engine initialization, memoized
    async fn engine(&self) -> Result<Arc<GeminiEngine>, EngineError> {
        let engine = self
            .engine
            .get_or_try_init(|| async {
                if self.config.api_key.trim().is_empty() {
                    return Err(EngineError::Configuration(
                        "Gemini API key not configured".to_string(),
                    ));
                }
                info!(model = %self.config.model_id, "engine initialized");
                Ok(Arc::new(GeminiEngine::new(
                    self.config.base_url.clone(),
                    self.config.model_id.clone(),
                    self.config.api_key.clone(),
                )))
            })
            .await?;
        Ok(engine.clone())
    }

    /// Health check: trigger the init guard and report the resolved model
    pub async fn health(&self) -> Result<String, EngineError> {
        Ok(self.engine().await?.model().to_string())
    }

    /// Conversation context: caller-supplied history plus the new message
    fn build_context(message: String, mut history: Vec<ChatTurn>) -> Vec<ChatTurn> {
        history.push(ChatTurn::user(message));
        history
    }

    /// Non-streaming generation
    ///
    /// Engine errors propagate; the HTTP layer translates them.
    pub async fn generate(
        &self,
        message: String,
        history: Vec<ChatTurn>,
        thinking_mode: bool,
    ) -> Result<AggregateResponse, EngineError> {
        let engine = self.engine().await?;
        let turns = Self::build_context(message, history);
        let params = GenerationParams::policy(thinking_mode);

        let parts = tokio::task::spawn_blocking(move || engine.generate(&turns, &params))
            .await
            .map_err(|e| EngineError::Io(format!("engine task failed: {e}")))??;

        Ok(collapse_parts(&parts, thinking_mode))
    }

    /// Streaming generation
    ///
    /// Initialization failures propagate here, before any fragment is
    /// produced. After that point every outcome — including an engine
    /// error mid-stream — arrives in-band through the returned stream.
    pub async fn stream(
        &self,
        message: String,
        history: Vec<ChatTurn>,
        thinking_mode: bool,
    ) -> Result<FragmentStream, EngineError> {
        let engine = self.engine().await?;
        let turns = Self::build_context(message, history);
        let params = GenerationParams::policy(thinking_mode);

        let (tx, rx) = mpsc::channel::<StreamEvent>(STREAM_CHANNEL_CAPACITY);
        tokio::task::spawn_blocking(move || {
            let result = engine.stream_generate(&turns, &params, |chunk| {
                match fragment_from_chunk(&chunk, thinking_mode) {
                    // Returning false stops the transport read once the
                    // consumer has dropped the stream.
                    Some(fragment) => tx.blocking_send(StreamEvent::Fragment(fragment)).is_ok(),
                    None => !tx.is_closed(),
                }
            });
            let terminal = match result {
                Ok(()) => StreamEvent::Done,
                Err(e) => {
                    error!(error = %e, "engine stream failed");
                    StreamEvent::Failed(e)
                }
            };
            // Send fails only when the consumer is already gone
            let _ = tx.blocking_send(terminal);
        });

        Ok(FragmentStream::new(rx))
    }
}

/// Ordered fragment sequence with a single guaranteed terminal fragment
///
/// Wraps the event channel: `Done` becomes the empty final fragment,
/// `Failed` becomes a final fragment carrying the error text, and a driver
/// that vanishes without a terminal event is surfaced as a failure rather
/// than a silent end. Dropping the stream closes the channel, which stops
/// the blocking driver at its next send.
pub struct FragmentStream {
    rx: mpsc::Receiver<StreamEvent>,
    done: bool,
}

impl FragmentStream {
    fn new(rx: mpsc::Receiver<StreamEvent>) -> Self {
        Self { rx, done: false }
    }
}

impl Stream for FragmentStream {
    type Item = StreamFragment;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(StreamEvent::Fragment(fragment))) => Poll::Ready(Some(fragment)),
            Poll::Ready(Some(StreamEvent::Done)) => {
                this.done = true;
                Poll::Ready(Some(StreamFragment::done()))
            }
            Poll::Ready(Some(StreamEvent::Failed(e))) => {
                this.done = true;
                Poll::Ready(Some(StreamFragment::failed(&e.to_string())))
            }
            Poll::Ready(None) => {
                // Driver dropped without a terminal event
                this.done = true;
                Poll::Ready(Some(StreamFragment::failed(
                    "response stream ended unexpectedly",
                )))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
