//! Response decoding for the chat completions wire format
//!
//! Decoding is deliberately permissive: the deserialize-side structs model
//! only the fields the connector needs, and serde ignores everything else.
//! Enterprise gateway variants decorate responses with content-filter
//! metadata (`prompt_filter_results`, per-choice `content_filter_results`);
//! those pass through without a dedicated response type. `usage` is optional
//! for the same reason.
//!
//! Status handling is not this module's job — the resilient transport only
//! hands over 2xx bodies.

use crate::types::{ChatResult, FunctionCall, MessageRole, Usage};
use crate::{Error, Result};
use serde::Deserialize;

/// Raw chat completion response body
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    /// The model the server says it used; informational only
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ResponseChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseChoice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMessage {
    #[serde(default)]
    pub role: Option<MessageRole>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub function_call: Option<WireFunctionCall>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireFunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Decode a raw response body into a [`ChatResult`].
///
/// `requested_model` is the model identifier the client was configured with;
/// it becomes the result's `model_id`. Backend variants report the body-level
/// `model` field inconsistently, so it is only compared for a debug log, not
/// trusted.
///
/// Fails with `MalformedResponse` when the body is not valid JSON, has no
/// choices, or the first choice has no message object.
pub fn decode_response(body: &str, requested_model: &str) -> Result<ChatResult> {
    let response: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| Error::malformed_response(format!("invalid response body: {}", e)))?;

    if let Some(reported) = response.model.as_deref() {
        if reported != requested_model {
            tracing::debug!(requested = requested_model, reported, "backend reported a different model id");
        }
    }

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::malformed_response("response contains no choices"))?;

    let message = choice
        .message
        .ok_or_else(|| Error::malformed_response("first choice contains no message"))?;

    Ok(ChatResult {
        role: message.role.unwrap_or(MessageRole::Assistant),
        content: message.content,
        function_call: message.function_call.map(|call| FunctionCall {
            name: call.name,
            arguments: call.arguments,
        }),
        model_id: requested_model.to_string(),
        usage: response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}
