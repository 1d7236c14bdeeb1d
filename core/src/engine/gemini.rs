//! Gemini engine client
//!
//! Google Generative Language REST API client.
//!
//! Base URL: https://generativelanguage.googleapis.com/v1beta
//! Endpoints: /models/{model}:generateContent (one-shot)
//!            /models/{model}:streamGenerateContent?alt=sse (incremental)
//!
//! Both calls take the same request body; the streaming endpoint delivers
//! partial results as SSE `data:` lines with the same per-chunk shape.

use serde_json::Value as JsonValue;

use crate::engine::transport::{SyncTransport, Transport};
use crate::engine::{ChatTurn, EngineChunk, EngineError, EnginePart, EngineRole, GenerationParams};

/// Gemini engine client
///
/// Cheap to share: constructed once by the init guard and handed out
/// read-only to every request.
#[derive(Debug, Clone)]
pub struct GeminiEngine {
    /// Base URL (e.g., https://generativelanguage.googleapis.com/v1beta)
    base_url: String,
    /// Model identifier (e.g., gemini-2.5-flash)
    model: String,
    /// API key
    api_key: String,
    /// HTTP transport
    transport: Transport,
}

impl GeminiEngine {
    /// Create new engine client with the real transport
    pub fn new(base_url: String, model: String, api_key: String) -> Self {
        Self {
            base_url,
            model,
            api_key,
            transport: Transport::default(),
        }
    }

    /// Create engine client with custom transport (for testing)
    pub fn with_transport(
        base_url: String,
        model: String,
        api_key: String,
        transport: Transport,
    ) -> Self {
        Self {
            base_url,
            model,
            api_key,
            transport,
        }
    }

    /// Get model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }

    /// Build request body from conversation turns and generation parameters
    ///
    /// The engine knows two roles: "user" and "model". User turns map to
    /// "user"; assistant and system turns map to "model".
    pub fn build_request(&self, turns: &[ChatTurn], params: &GenerationParams) -> String {
        let contents: Vec<JsonValue> = turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    EngineRole::User => "user",
                    EngineRole::Assistant | EngineRole::System => "model",
                };
                serde_json::json!({
                    "role": role,
                    "parts": [{"text": turn.content}]
                })
            })
            .collect();

        let mut generation_config = serde_json::json!({
            "temperature": params.temperature,
            "maxOutputTokens": params.max_output_tokens,
            "topP": params.top_p,
            "topK": params.top_k,
        });
        if params.include_thoughts {
            generation_config["thinkingConfig"] = serde_json::json!({
                "includeThoughts": true
            });
        }

        serde_json::json!({
            "contents": contents,
            "generationConfig": generation_config,
        })
        .to_string()
    }

    fn headers(&self) -> [(&str, &str); 2] {
        [
            ("x-goog-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    /// One-shot generation: submit the conversation, return all reply parts
    pub fn generate(
        &self,
        turns: &[ChatTurn],
        params: &GenerationParams,
    ) -> Result<Vec<EnginePart>, EngineError> {
        let body = self.build_request(turns, params);
        let response = self
            .transport
            .post_json(&self.generate_url(), &self.headers(), &body)?;
        let json: JsonValue = serde_json::from_str(&response)
            .map_err(|e| EngineError::InvalidResponse(format!("malformed engine result: {e}")))?;
        Ok(parse_parts(&json))
    }

    /// Incremental generation: submit the conversation, deliver one chunk
    /// per SSE event
    ///
    /// `on_chunk` returning `false` stops consumption (caller disconnected).
    /// Chunk order is the engine's order; nothing is buffered or reordered.
    pub fn stream_generate<F>(
        &self,
        turns: &[ChatTurn],
        params: &GenerationParams,
        mut on_chunk: F,
    ) -> Result<(), EngineError>
    where
        F: FnMut(EngineChunk) -> bool,
    {
        let body = self.build_request(turns, params);
        self.transport
            .post_stream(&self.stream_url(), &self.headers(), &body, |line| {
                match parse_sse_line(line) {
                    Some(chunk) => on_chunk(chunk),
                    None => true,
                }
            })
    }
}

/// Extract reply parts from a generateContent result
///
/// Missing candidates or content are an empty contribution, not an error.
pub fn parse_parts(json: &JsonValue) -> Vec<EnginePart> {
    let mut parts = Vec::new();
    if let Some(raw_parts) = json["candidates"][0]["content"]["parts"].as_array() {
        for part in raw_parts {
            parts.push(EnginePart {
                text: part["text"].as_str().unwrap_or("").to_string(),
                thought: part["thought"].as_bool().unwrap_or(false),
            });
        }
    }
    parts
}

/// Parse one SSE line into an engine chunk
///
/// Returns `None` for non-data lines (blank keep-alives, comments) and for
/// payloads that are not valid JSON.
pub fn parse_sse_line(line: &str) -> Option<EngineChunk> {
    let data = line.strip_prefix("data:")?.trim_start();
    let json: JsonValue = serde_json::from_str(data).ok()?;
    Some(EngineChunk {
        parts: parse_parts(&json),
    })
}
