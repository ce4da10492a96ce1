//! # Chat Connector
//!
//! A Rust connector for OpenAI-compatible chat completion APIs with
//! function-calling support and configurable retry policies.
//!
//! ## Overview
//!
//! The crate splits a chat completion call into three pure, independently
//! testable pieces plus the client that wires them to HTTP:
//!
//! - **Request encoding**: conversation history, execution settings, and a
//!   function-call policy become a JSON request body. The tricky part is the
//!   per-message precedence rule for function names, which the message model
//!   enforces structurally.
//! - **Response decoding**: permissive parsing that extracts the first
//!   choice's message, an optional function call (arguments stay an opaque
//!   raw string), and usage statistics, while ignoring backend-variant
//!   extras such as content-filter metadata.
//! - **Resilient transport**: a retry wrapper whose "is this outcome
//!   retryable" decision is a plain predicate over status/transport
//!   outcomes, so unusual policies (retry on 401, say) are one line.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use chat_connector::{ChatClient, ChatHistory, ChatOptions, FunctionCallPolicy, function};
//!
//! #[tokio::main]
//! async fn main() -> chat_connector::Result<()> {
//!     let options = ChatOptions::builder()
//!         .model("gpt-3.5-turbo")
//!         .base_url("https://api.openai.com/v1")
//!         .api_key(std::env::var("OPENAI_API_KEY").unwrap_or_default())
//!         .build()?;
//!
//!     let client = ChatClient::new(options)?;
//!
//!     let date = function("Date", "Returns the current date")
//!         .plugin("TimePlugin")
//!         .param("Format", "string", "Date format")
//!         .build();
//!
//!     let mut history = ChatHistory::new();
//!     history.add_user_message("What day is it?");
//!
//!     let result = client
//!         .complete(&history, &FunctionCallPolicy::Auto(vec![date]))
//!         .await?;
//!
//!     match result.function_call {
//!         Some(call) => println!("model wants {} with {}", call.name, call.arguments),
//!         None => println!("{}", result.content.unwrap_or_default()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **types**: conversation model, execution settings, results
//! - **functions**: function descriptors and the call policy
//! - **request**: request body encoding (pure)
//! - **response**: response body decoding (pure)
//! - **transport**: retry policy and the resilient send loop
//! - **client**: the HTTP-facing `ChatClient`
//! - **error**: error types and conversions

/// Chat client wiring encoder, resilient transport, and decoder together.
mod client;

/// Error types and conversions used across all public APIs.
mod error;

/// Function descriptors, the qualified-name rule, and the call policy.
mod functions;

/// Request body encoding for the chat completions wire format.
mod request;

/// Response body decoding, tolerant of backend variants.
mod response;

/// Retry policy configuration and the resilient send wrapper.
mod transport;

/// Conversation model, execution settings, and result types.
mod types;

// --- Client API ---

pub use client::{ChatClient, complete_text};

// --- Error Handling ---

pub use error::{Error, Result};

// --- Function Calling ---

pub use functions::{
    FunctionBuilder, FunctionCallPolicy, FunctionDescriptor, FunctionParameter, function,
};

// --- Request / Response Mapping ---

pub use request::{ChatRequest, FunctionCallDirective, WireFunction, WireFunctionCall, WireMessage, encode_request};
pub use response::decode_response;

// --- Resilient Transport ---

pub use transport::{AttemptOutcome, HttpOutcome, RetryPolicy, RetryPredicate, send_with_retry};

// --- Core Types ---

pub use types::{
    ChatHistory, ChatMessage, ChatOptions, ChatOptionsBuilder, ChatResult, FunctionCall,
    MessageContent, MessageRole, Usage,
};

/// Convenience module containing the most commonly used types and functions.
/// Import with `use chat_connector::prelude::*;`.
pub mod prelude {
    pub use crate::{
        ChatClient, ChatHistory, ChatMessage, ChatOptions, ChatResult, Error, FunctionCall,
        FunctionCallPolicy, FunctionDescriptor, MessageContent, MessageRole, Result, RetryPolicy,
        complete_text, function,
    };
}
