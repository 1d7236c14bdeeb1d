//! Response normalization
//!
//! Converts raw engine output (bundled parts or one incremental chunk) into
//! the two-channel answer/thoughts representation served to clients.
//!
//! Thinking-mode suppression happens here: the thoughts channel is surfaced
//! only when the caller asked for it, even if the engine produced
//! reasoning-marked parts anyway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{EngineChunk, EnginePart};

/// Complete non-streaming result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregateResponse {
    /// Full answer text
    pub content: String,
    /// Full reasoning text (present only under thinking mode)
    pub thoughts: Option<String>,
    /// Response timestamp
    pub timestamp: DateTime<Utc>,
}

/// One incremental unit of normalized streaming output
///
/// Exactly one fragment per stream has `is_final = true`, and it is the
/// last one emitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamFragment {
    /// Answer text delta
    pub content: String,
    /// Reasoning text delta (present only under thinking mode)
    pub thoughts: Option<String>,
    /// Whether this is the terminal fragment
    pub is_final: bool,
}

impl StreamFragment {
    /// Terminal fragment for a normally completed stream
    pub fn done() -> Self {
        Self {
            content: String::new(),
            thoughts: None,
            is_final: true,
        }
    }

    /// Terminal fragment carrying an error message in the answer channel
    pub fn failed(message: &str) -> Self {
        Self {
            content: format!("Error: {message}"),
            thoughts: None,
            is_final: true,
        }
    }
}

/// Split parts into (answer, thoughts) concatenations
fn split_channels(parts: &[EnginePart]) -> (String, String) {
    let mut content = String::new();
    let mut thoughts = String::new();
    for part in parts {
        if part.thought {
            thoughts.push_str(&part.text);
        } else {
            content.push_str(&part.text);
        }
    }
    (content, thoughts)
}

/// Collapse a complete engine reply into an aggregate response
///
/// An empty part list collapses to empty content rather than an error.
pub fn collapse_parts(parts: &[EnginePart], thinking_mode: bool) -> AggregateResponse {
    let (content, thoughts) = split_channels(parts);
    AggregateResponse {
        content,
        thoughts: thinking_mode.then_some(thoughts),
        timestamp: Utc::now(),
    }
}

/// Turn one raw chunk into a non-final fragment
///
/// Chunks with no text in either channel are dropped (`None`) so the
/// caller never sees an empty fragment.
pub fn fragment_from_chunk(chunk: &EngineChunk, thinking_mode: bool) -> Option<StreamFragment> {
    let (content, thoughts) = split_channels(&chunk.parts);
    if content.is_empty() && thoughts.is_empty() {
        return None;
    }
    Some(StreamFragment {
        content,
        thoughts: thinking_mode.then_some(thoughts),
        is_final: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(text: &str, thought: bool) -> EnginePart {
        EnginePart {
            text: text.to_string(),
            thought,
        }
    }

    #[test]
    fn test_collapse_separates_channels() {
        let parts = vec![
            part("First I consider.", true),
            part("Hi ", false),
            part("Then I answer.", true),
            part("there!", false),
        ];
        let response = collapse_parts(&parts, true);
        assert_eq!(response.content, "Hi there!");
        assert_eq!(
            response.thoughts.as_deref(),
            Some("First I consider.Then I answer.")
        );
    }

    #[test]
    fn test_collapse_suppresses_thoughts_without_thinking_mode() {
        let parts = vec![part("hidden reasoning", true), part("Hi there!", false)];
        let response = collapse_parts(&parts, false);
        assert_eq!(response.content, "Hi there!");
        assert!(response.thoughts.is_none());
    }

    #[test]
    fn test_collapse_empty_parts() {
        let response = collapse_parts(&[], false);
        assert_eq!(response.content, "");
        assert!(response.thoughts.is_none());
    }

    #[test]
    fn test_fragment_from_chunk() {
        let chunk = EngineChunk {
            parts: vec![part("Hel", false)],
        };
        let fragment = fragment_from_chunk(&chunk, false).unwrap();
        assert_eq!(fragment.content, "Hel");
        assert!(fragment.thoughts.is_none());
        assert!(!fragment.is_final);
    }

    #[test]
    fn test_fragment_drops_empty_chunk() {
        assert!(fragment_from_chunk(&EngineChunk::default(), false).is_none());

        let metadata_only = EngineChunk {
            parts: vec![part("", false)],
        };
        assert!(fragment_from_chunk(&metadata_only, true).is_none());
    }

    #[test]
    fn test_fragment_thought_only_chunk() {
        let chunk = EngineChunk {
            parts: vec![part("pondering", true)],
        };
        let fragment = fragment_from_chunk(&chunk, true).unwrap();
        assert_eq!(fragment.content, "");
        assert_eq!(fragment.thoughts.as_deref(), Some("pondering"));
    }

    #[test]
    fn test_terminal_fragments() {
        let done = StreamFragment::done();
        assert!(done.is_final);
        assert!(done.content.is_empty());

        let failed = StreamFragment::failed("engine unreachable");
        assert!(failed.is_final);
        assert_eq!(failed.content, "Error: engine unreachable");
    }
}
