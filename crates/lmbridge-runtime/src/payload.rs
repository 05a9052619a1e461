//! Native request payload.
//!
//! The engine takes an OpenAI-style chat request whose `model` field is the
//! local model directory (or `+`-joined directories) rather than an id.

use lmbridge_core::{ChatMessage, ChatRequest};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct NativeRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f64>,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Serialize `request` for the engine.
///
/// `model_path` replaces the request's model id when given.
pub fn build_request_json(
    request: &ChatRequest,
    model_path: Option<&str>,
    stream: bool,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&NativeRequest {
        model: model_path.unwrap_or(&request.model),
        max_tokens: request.max_tokens,
        top_p: request.top_p,
        presence_penalty: request.presence_penalty,
        frequency_penalty: request.frequency_penalty,
        messages: &request.messages,
        stream,
    })
}
