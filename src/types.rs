//! Core types for the chat connector
//!
//! This module defines the conversation model (roles, messages, history), the
//! execution settings used to configure a [`crate::ChatClient`], and the
//! [`ChatResult`] returned after decoding a completion response.
//!
//! The message model deliberately makes the "what kind of content is this"
//! question a tagged enum rather than a bag of optional fields: a message is
//! plain text, a function call emitted by the assistant, or the result of a
//! function the caller executed. The request encoder leans on this to decide
//! how the message goes on the wire (see `request.rs`).

use crate::transport::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Execution settings for chat completion requests
#[derive(Clone)]
pub struct ChatOptions {
    /// Model identifier (e.g., "gpt-3.5-turbo")
    pub model: String,

    /// OpenAI-compatible endpoint URL
    pub base_url: String,

    /// API key sent as a bearer token
    pub api_key: String,

    /// Sampling temperature (0.0 to 2.0), None uses provider default
    pub temperature: Option<f32>,

    /// Maximum tokens to generate (None uses provider default)
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Retry policy applied to every outbound call
    pub retry_policy: RetryPolicy,
}

impl std::fmt::Debug for ChatOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatOptions")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

impl ChatOptions {
    /// Create a new builder for ChatOptions
    pub fn builder() -> ChatOptionsBuilder {
        ChatOptionsBuilder::default()
    }
}

/// Builder for ChatOptions
#[derive(Default)]
pub struct ChatOptionsBuilder {
    model: Option<String>,
    base_url: Option<String>,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Option<u64>,
    retry_policy: Option<RetryPolicy>,
}

impl ChatOptionsBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn build(self) -> crate::Result<ChatOptions> {
        let model = self
            .model
            .ok_or_else(|| crate::Error::config("model is required"))?;

        let base_url = self
            .base_url
            .ok_or_else(|| crate::Error::config("base_url is required"))?;

        Ok(ChatOptions {
            model,
            base_url,
            api_key: self.api_key.unwrap_or_else(|| "not-needed".to_string()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: self.timeout.unwrap_or(60),
            retry_policy: self.retry_policy.unwrap_or_default(),
        })
    }
}

/// Message role in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Function,
}

/// What a message carries.
///
/// The variant determines the wire encoding of the message:
///
/// - `Text` is sent as plain `content`; if the message also has an author
///   name, that name goes out as a top-level `name` field.
/// - `FunctionCall` is sent as a nested `function_call: {name, arguments}`
///   object and never produces a top-level `name` field.
/// - `FunctionResult` is sent with the function name as the top-level `name`
///   field and the result value as `content`.
///
/// Arguments are an opaque raw JSON string. Argument schemas are defined by
/// the caller's functions, so the connector passes them through byte-for-byte
/// without parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain text content
    Text(String),
    /// A function invocation emitted by the assistant
    FunctionCall { name: String, arguments: String },
    /// The result of a function the caller executed
    FunctionResult { name: String, value: String },
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: MessageContent,
    /// Optional author name for text messages (e.g., to distinguish users in
    /// a multi-party conversation)
    pub author_name: Option<String>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: MessageContent) -> Self {
        Self {
            role,
            content,
            author_name: None,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageRole::System, MessageContent::Text(text.into()))
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, MessageContent::Text(text.into()))
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, MessageContent::Text(text.into()))
    }

    /// Create an assistant message recording a function call, as returned by
    /// the model in a previous turn
    pub fn function_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self::new(
            MessageRole::Assistant,
            MessageContent::FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        )
    }

    /// Create a function-role message carrying the result of an executed
    /// function back to the model
    pub fn function_result(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            MessageRole::Function,
            MessageContent::FunctionResult {
                name: name.into(),
                value: value.into(),
            },
        )
    }

    /// Attach an author name to this message
    pub fn with_author_name(mut self, name: impl Into<String>) -> Self {
        self.author_name = Some(name.into());
        self
    }
}

/// Ordered conversation history.
///
/// Thin wrapper over `Vec<ChatMessage>` with convenience methods for the
/// common roles. Derefs to a message slice so it can be passed anywhere a
/// `&[ChatMessage]` is expected.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    /// Create a new and empty chat history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history seeded with a system message, unless it is blank
    pub fn with_system_message(system_message: impl Into<String>) -> Self {
        let system_message = system_message.into();
        let mut history = Self::new();
        if !system_message.trim().is_empty() {
            history.add_system_message(system_message);
        }
        history
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn add_system_message(&mut self, text: impl Into<String>) {
        self.add_message(ChatMessage::system(text));
    }

    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.add_message(ChatMessage::user(text));
    }

    pub fn add_assistant_message(&mut self, text: impl Into<String>) {
        self.add_message(ChatMessage::assistant(text));
    }

    pub fn add_function_result(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.add_message(ChatMessage::function_result(name, value));
    }

    /// Record the assistant turn from a completion result, so the follow-up
    /// request carries it
    pub fn add_result(&mut self, result: &ChatResult) {
        let content = match &result.function_call {
            Some(call) => MessageContent::FunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
            None => MessageContent::Text(result.content.clone().unwrap_or_default()),
        };
        self.add_message(ChatMessage::new(result.role.clone(), content));
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl std::ops::Deref for ChatHistory {
    type Target = [ChatMessage];

    fn deref(&self) -> &Self::Target {
        &self.messages
    }
}

impl IntoIterator for ChatHistory {
    type Item = ChatMessage;
    type IntoIter = std::vec::IntoIter<ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl FromIterator<ChatMessage> for ChatHistory {
    fn from_iter<T: IntoIterator<Item = ChatMessage>>(iter: T) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

/// A function call extracted from a completion response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    /// Qualified function name as reported by the model
    pub name: String,
    /// Raw JSON-encoded arguments, passed through unparsed
    pub arguments: String,
}

/// Token usage statistics reported by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The decoded result of a chat completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResult {
    /// Role of the returned message (assistant in practice)
    pub role: MessageRole,

    /// Text content; absent when the model chose to call a function
    pub content: Option<String>,

    /// Function call requested by the model, if any
    pub function_call: Option<FunctionCall>,

    /// The model this result is attributed to. Populated from the model the
    /// client requested, not the body's `model` field: backend variants
    /// report that field inconsistently.
    pub model_id: String,

    /// Token usage, when the backend reports it
    pub usage: Option<Usage>,
}
