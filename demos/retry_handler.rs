//! Retry handler example
//!
//! Demonstrates overriding the retry predicate. The policy here treats HTTP
//! 401 Unauthorized as retryable, which is a deliberately unusual choice:
//! with an invalid API key every attempt fails with 401, so you can watch
//! the retries in the log output until the policy gives up.

use chat_connector::{ChatClient, ChatHistory, ChatOptions, FunctionCallPolicy, RetryPolicy};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Retry on 401 Unauthorized, three attempts, short backoff
    let retry_policy = RetryPolicy::new()
        .with_max_attempts(3)
        .with_initial_delay(Duration::from_millis(500))
        .retry_on_status(401);

    let options = ChatOptions::builder()
        .model("gpt-4")
        .base_url("https://api.openai.com/v1")
        .api_key("BAD_KEY")
        .retry_policy(retry_policy)
        .build()?;

    let client = ChatClient::new(options)?;

    let question = "How popular is the Polly library?";
    println!("Question: {}", question);

    let mut history = ChatHistory::new();
    history.add_user_message(question);

    // The request goes out with an invalid API key and fails with 401. The
    // policy retries it until the attempt limit, then the call fails with
    // RetryExhausted. Every attempt shows up in the log output.
    match client.complete(&history, &FunctionCallPolicy::None).await {
        Ok(result) => println!("Answer: {}", result.content.unwrap_or_default()),
        Err(e) => println!("Error: {}", e),
    }

    Ok(())
}
