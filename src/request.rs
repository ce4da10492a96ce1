//! Request encoding for the chat completions wire format
//!
//! Pure transformation from (settings, messages, function-call policy) to the
//! JSON request body. No network I/O happens here.
//!
//! The one rule worth spelling out is the name/function_call precedence on a
//! per-message basis:
//!
//! 1. `role` and `content` are always present (`content` is null for
//!    assistant function-call messages).
//! 2. A function call is encoded as a nested `function_call: {name,
//!    arguments}` object, and the name never appears as a top-level `name`
//!    field alongside it.
//! 3. A function result (name without arguments) is encoded with a top-level
//!    `name` field instead.
//! 4. A plain text message emits `name` only when an author name is set.
//!
//! The [`crate::MessageContent`] enum makes this structural: a message cannot
//! carry both a nested call and a top-level function name.

use crate::functions::{FunctionCallPolicy, FunctionDescriptor};
use crate::types::{ChatMessage, ChatOptions, MessageContent, MessageRole};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::collections::HashSet;

/// A single message as it goes on the wire
#[derive(Debug, Clone, Serialize)]
pub struct WireMessage {
    pub role: MessageRole,
    /// Always serialized; null for assistant function-call messages
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<WireFunctionCall>,
}

/// Nested function-call object on an outgoing message
#[derive(Debug, Clone, Serialize)]
pub struct WireFunctionCall {
    pub name: String,
    /// Raw JSON-encoded arguments, passed through untouched
    pub arguments: String,
}

/// The `function_call` directive at the request level
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FunctionCallDirective {
    /// `"auto"` — the model decides among the advertised functions
    Mode(String),
    /// `{"name": ...}` — the model must call the named function
    Function { name: String },
}

/// A function descriptor as it goes on the wire
#[derive(Debug, Clone, Serialize)]
pub struct WireFunction {
    /// Qualified name (`<plugin>_<name>`)
    pub name: String,
    pub description: String,
    /// JSON Schema object for the parameters
    pub parameters: Value,
}

/// The full chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functions: Option<Vec<WireFunction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallDirective>,
}

/// Build the request body for a chat completion call.
///
/// Fails with `InvalidArgument` when a `Require` policy names a descriptor
/// without a function name, or when two advertised descriptors collide on
/// their qualified name.
pub fn encode_request(
    options: &ChatOptions,
    messages: &[ChatMessage],
    policy: &FunctionCallPolicy,
) -> Result<ChatRequest> {
    let (functions, function_call) = encode_policy(policy)?;

    Ok(ChatRequest {
        model: options.model.clone(),
        messages: messages.iter().map(encode_message).collect(),
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        functions,
        function_call,
    })
}

fn encode_message(message: &ChatMessage) -> WireMessage {
    match &message.content {
        MessageContent::Text(text) => WireMessage {
            role: message.role.clone(),
            content: Some(text.clone()),
            name: message.author_name.clone(),
            function_call: None,
        },
        MessageContent::FunctionCall { name, arguments } => WireMessage {
            role: message.role.clone(),
            content: None,
            // Name lives only inside function_call here
            name: None,
            function_call: Some(WireFunctionCall {
                name: name.clone(),
                arguments: arguments.clone(),
            }),
        },
        MessageContent::FunctionResult { name, value } => WireMessage {
            role: message.role.clone(),
            content: Some(value.clone()),
            name: Some(name.clone()),
            function_call: None,
        },
    }
}

fn encode_policy(
    policy: &FunctionCallPolicy,
) -> Result<(Option<Vec<WireFunction>>, Option<FunctionCallDirective>)> {
    match policy {
        FunctionCallPolicy::None => Ok((None, None)),
        FunctionCallPolicy::Auto(descriptors) => {
            let functions = encode_descriptors(descriptors)?;
            Ok((
                Some(functions),
                Some(FunctionCallDirective::Mode("auto".to_string())),
            ))
        }
        FunctionCallPolicy::Require(descriptor) => {
            let functions = encode_descriptors(std::slice::from_ref(descriptor))?;
            Ok((
                Some(functions),
                Some(FunctionCallDirective::Function {
                    name: descriptor.qualified_name(),
                }),
            ))
        }
    }
}

fn encode_descriptors(descriptors: &[FunctionDescriptor]) -> Result<Vec<WireFunction>> {
    let mut seen = HashSet::new();
    let mut functions = Vec::with_capacity(descriptors.len());

    for descriptor in descriptors {
        if descriptor.name.is_empty() {
            return Err(Error::invalid_argument(
                "function descriptor is missing a name",
            ));
        }
        let qualified = descriptor.qualified_name();
        if !seen.insert(qualified.clone()) {
            return Err(Error::invalid_argument(format!(
                "duplicate function name '{}' in function list",
                qualified
            )));
        }
        functions.push(WireFunction {
            name: qualified,
            description: descriptor.description.clone(),
            parameters: parameters_schema(descriptor),
        });
    }

    Ok(functions)
}

/// Build the JSON Schema object for a descriptor's parameters.
///
/// Properties are inserted in caller-supplied order; serde_json's
/// preserve_order feature keeps that order on the wire.
fn parameters_schema(descriptor: &FunctionDescriptor) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &descriptor.parameters {
        properties.insert(
            param.name.clone(),
            json!({
                "type": &param.type_tag,
                "description": &param.description,
            }),
        );
        if param.required {
            required.push(Value::String(param.name.clone()));
        }
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
