//! Function calling example
//!
//! Demonstrates the full function-calling loop against a local
//! OpenAI-compatible server: advertise functions, catch the model's function
//! call, execute it locally, feed the result back, and get the final answer.

use chat_connector::{
    ChatClient, ChatHistory, ChatOptions, FunctionCallPolicy, function,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let options = ChatOptions::builder()
        .model("qwen3:8b")
        .base_url("http://localhost:11434/v1")
        .temperature(0.2)
        .build()?;

    let client = ChatClient::new(options)?;

    let date = function("Date", "Returns today's date")
        .plugin("TimePlugin")
        .param("Format", "string", "Date format")
        .build();
    let now = function("Now", "Returns the current time")
        .plugin("TimePlugin")
        .param("Format", "string", "Time format")
        .build();
    let policy = FunctionCallPolicy::Auto(vec![date, now]);

    let mut history = ChatHistory::with_system_message("You are a helpful assistant");
    history.add_user_message("What day is it today?");

    let result = client.complete(&history, &policy).await?;

    match &result.function_call {
        Some(call) => {
            println!("Model called: {}({})", call.name, call.arguments);

            // Execute the function locally and hand the result back
            let value = match call.name.as_str() {
                "TimePlugin_Date" => "2023-11-08".to_string(),
                "TimePlugin_Now" => "09:15".to_string(),
                other => format!("unknown function: {}", other),
            };

            history.add_result(&result);
            history.add_function_result(&call.name, value);

            let followup = client.complete(&history, &policy).await?;
            println!("Answer: {}", followup.content.unwrap_or_default());
        }
        None => {
            println!("Answer: {}", result.content.unwrap_or_default());
        }
    }

    if let Some(usage) = result.usage {
        println!(
            "Usage: {} prompt + {} completion = {} tokens",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
    }

    Ok(())
}
