//! Tools the agent can call, and the registry that dispatches to them.

mod error;
mod registry;

use std::pin::Pin;

pub use error::{Error, ErrorKind};
pub use registry::{Registry, ToolInput, decode_input};

/// The result of a tool call.
pub type ToolResult = Result<String, Error>;

/// A named, described unit of work the model may ask for.
///
/// Every tool takes one piece of text and answers with text; any structure
/// inside the input (such as `city|start|end`) is the tool's own business
/// and should be spelled out in its [`description`](Self::description),
/// since that is all the model gets to see.
pub trait Tool: Send + Sync + 'static {
    /// Returns the name of the tool.
    ///
    /// OpenAI-compatible backends only accept `[a-zA-Z0-9_-]` here.
    fn name(&self) -> &str;

    /// Returns the description shown to the model.
    fn description(&self) -> &str;

    /// Runs the tool.
    ///
    /// The returned future must not borrow `self`.
    fn invoke(
        &self,
        input: String,
    ) -> impl Future<Output = ToolResult> + Send + 'static;
}

pub(crate) type BoxedToolFuture =
    Pin<Box<dyn Future<Output = ToolResult> + Send>>;

pub(crate) trait ToolObject: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn invoke(&self, input: String) -> BoxedToolFuture;
}

pub(crate) struct AnyTool<T: Tool>(pub T);

impl<T: Tool> ToolObject for AnyTool<T> {
    #[inline]
    fn name(&self) -> &str {
        self.0.name()
    }

    #[inline]
    fn description(&self) -> &str {
        self.0.description()
    }

    #[inline]
    fn invoke(&self, input: String) -> BoxedToolFuture {
        Box::pin(self.0.invoke(input))
    }
}
