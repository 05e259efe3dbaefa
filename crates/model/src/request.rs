use serde_json::Value;

use crate::OpaqueMessage;

/// A request to be sent to the model provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelRequest {
    /// The conversation so far, oldest first.
    pub messages: Vec<ModelMessage>,
    /// Tools the model may ask to call.
    pub tools: Vec<ModelTool>,
}

/// One message of the conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// Text written by the user, e.g. the trip planning goal.
    User(String),
    /// Plain assistant text.
    Assistant(String),
    /// The output of a tool the model asked for.
    Tool(ToolCallResult),
    /// A provider-specific assistant message, kept verbatim so tool call
    /// bookkeeping survives the round trip.
    Opaque(OpaqueMessage),
}

/// The result of calling a tool.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolCallResult {
    /// The identifier of the tool call this result answers.
    pub id: String,
    /// The textual output of the tool.
    pub content: String,
}

/// Describes a tool that can be used by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelTool {
    /// Name of the tool.
    pub name: String,
    /// Description the model uses to decide when to call the tool.
    pub description: String,
    /// [JSON schema](https://json-schema.org/) of the tool arguments.
    pub parameters: Value,
}
