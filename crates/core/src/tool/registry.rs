use std::sync::LazyLock;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use trip_planner_model::ModelTool;

use super::{AnyTool, BoxedToolFuture, Error, Tool, ToolObject};

/// The single argument every tool receives.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToolInput {
    /// The text handed to the tool.
    #[schemars(
        description = "Input for the tool, formatted as its description says."
    )]
    pub input: String,
}

static PARAMETER_SCHEMA: LazyLock<Value> =
    LazyLock::new(|| schema_for!(ToolInput).to_value());

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInput {
    Wrapped(ToolInput),
    Text(String),
}

/// Extracts the textual input from tool call arguments.
///
/// Accepts both `{"input": "..."}` and a bare JSON string, since smaller
/// local models are not consistent about it.
pub fn decode_input(arguments: Value) -> Result<String, Error> {
    match serde_json::from_value(arguments) {
        Ok(RawInput::Wrapped(ToolInput { input }))
        | Ok(RawInput::Text(input)) => Ok(input),
        Err(_) => Err(Error::invalid_input()
            .with_reason("expected an object with a string field `input`")),
    }
}

/// The set of tools handed to the agent, kept in registration order.
#[derive(Default)]
pub struct Registry {
    tools: Vec<Box<dyn ToolObject>>,
}

impl Registry {
    /// Adds a tool, replacing any earlier tool with the same name.
    pub fn register<T: Tool>(&mut self, tool: T) {
        let tool: Box<dyn ToolObject> = Box::new(AnyTool(tool));
        match self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            Some(slot) => {
                warn!("replacing tool `{}`", tool.name());
                *slot = tool;
            }
            None => self.tools.push(tool),
        }
    }

    /// Returns the number of registered tools.
    #[inline]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tool is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns the tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Describes the tools to the model.
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.tools
            .iter()
            .map(|tool| ModelTool {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: PARAMETER_SCHEMA.clone(),
            })
            .collect()
    }

    /// Starts the tool called `name`, or returns `None` if there is none.
    pub fn invoke(&self, name: &str, input: String) -> Option<BoxedToolFuture> {
        let tool = self.tools.iter().find(|t| t.name() == name)?;
        trace!("invoking `{name}` with {input:?}");
        Some(tool.invoke(input))
    }
}
