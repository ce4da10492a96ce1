//! Chat completion client
//!
//! [`ChatClient`] wires the three pure pieces together: the request encoder
//! builds the body, the resilient transport sends it (retrying per the
//! configured policy), and the response decoder turns the body into a
//! [`ChatResult`]. Encoder and decoder errors surface immediately and are
//! never retried; only send outcomes go through the retry policy.
//!
//! Each `complete()` call is an independent future with its own attempt
//! sequence. The client holds no per-call state, so a single instance can
//! serve concurrent calls through `&self`; the underlying `reqwest::Client`
//! pools connections internally.
//!
//! # Examples
//!
//! ```rust,no_run
//! use chat_connector::{ChatClient, ChatHistory, ChatOptions, FunctionCallPolicy};
//!
//! #[tokio::main]
//! async fn main() -> chat_connector::Result<()> {
//!     let options = ChatOptions::builder()
//!         .model("gpt-3.5-turbo")
//!         .base_url("http://localhost:1234/v1")
//!         .build()?;
//!
//!     let client = ChatClient::new(options)?;
//!
//!     let mut history = ChatHistory::with_system_message("You are a helpful assistant");
//!     history.add_user_message("What's the capital of France?");
//!
//!     let result = client.complete(&history, &FunctionCallPolicy::None).await?;
//!     println!("{}", result.content.unwrap_or_default());
//!     Ok(())
//! }
//! ```

use crate::functions::FunctionCallPolicy;
use crate::request::encode_request;
use crate::response::decode_response;
use crate::transport::{HttpOutcome, send_with_retry};
use crate::types::{ChatHistory, ChatMessage, ChatOptions, ChatResult};
use crate::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Client for chat completion requests against an OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    options: ChatOptions,
    interrupted: Arc<AtomicBool>,
}

impl ChatClient {
    /// Create a client from execution settings.
    ///
    /// The HTTP client is built once with the configured timeout and reused
    /// across calls.
    pub fn new(options: ChatOptions) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            http,
            options,
            interrupted: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The settings this client was configured with
    pub fn options(&self) -> &ChatOptions {
        &self.options
    }

    /// Handle for cancelling in-flight calls from another task.
    ///
    /// Storing `true` makes pending and future calls on this client fail
    /// with [`Error::Cancelled`]; a call waiting on a send or a backoff
    /// delay aborts that wait rather than letting it run out.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    /// Send the conversation and return the model's continuation.
    ///
    /// `messages` is the full ordered history; `policy` controls whether and
    /// how functions are advertised. The returned result carries the
    /// configured model id and, when the backend reports it, token usage.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        policy: &FunctionCallPolicy,
    ) -> Result<ChatResult> {
        let request = encode_request(&self.options, messages, policy)?;
        let url = format!("{}/chat/completions", self.options.base_url);

        tracing::debug!(
            model = %self.options.model,
            messages = messages.len(),
            "sending chat completion request"
        );

        let outcome = send_with_retry(
            &self.options.retry_policy,
            Some(&*self.interrupted),
            || {
                let http = self.http.clone();
                let url = url.clone();
                let api_key = self.options.api_key.clone();
                let request = request.clone();
                async move {
                    let response = http
                        .post(&url)
                        .header("Authorization", format!("Bearer {}", api_key))
                        .header("Content-Type", "application/json")
                        .json(&request)
                        .send()
                        .await
                        .map_err(Error::Http)?;

                    let status = response.status().as_u16();
                    let body = response.text().await.map_err(Error::Http)?;
                    Ok(HttpOutcome { status, body })
                }
            },
        )
        .await?;

        decode_response(&outcome.body, &self.options.model)
    }
}

/// One-shot convenience: send a single user prompt and return the result.
///
/// Builds a throwaway client, so prefer [`ChatClient`] for repeated calls.
///
/// # Examples
///
/// ```rust,no_run
/// use chat_connector::{ChatOptions, complete_text};
///
/// # async fn example() -> chat_connector::Result<()> {
/// let options = ChatOptions::builder()
///     .model("gpt-3.5-turbo")
///     .base_url("http://localhost:1234/v1")
///     .build()?;
///
/// let result = complete_text("What's the capital of France?", &options).await?;
/// println!("{}", result.content.unwrap_or_default());
/// # Ok(())
/// # }
/// ```
pub async fn complete_text(prompt: &str, options: &ChatOptions) -> Result<ChatResult> {
    let client = ChatClient::new(options.clone())?;
    let mut history = ChatHistory::new();
    history.add_user_message(prompt);
    client.complete(&history, &FunctionCallPolicy::None).await
}
