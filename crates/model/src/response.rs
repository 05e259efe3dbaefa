use std::pin::Pin;
use std::task::{self, Poll};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::OpaqueMessage;
use crate::provider::ModelProviderError;

/// A streamed response from the model provider.
pub trait ModelResponse: Sized + Send + 'static {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Attempts to pull out the next event from the response.
    ///
    /// # Return value
    ///
    /// - `Poll::Pending`: no event yet; the task is woken when one may be
    ///   ready.
    /// - `Poll::Ready(Ok(Some(event)))`: an event was produced and more may
    ///   follow.
    /// - `Poll::Ready(Ok(None))`: the response is complete. Further calls
    ///   keep returning `None`.
    /// - `Poll::Ready(Err(error))`: the response failed.
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>>;

    /// Returns the whole assistant message of this response in the form the
    /// provider wants to see again on the next request.
    ///
    /// Only meaningful once the response has been drained; implementations
    /// return the same message on every call.
    fn make_opaque_message(&self) -> Option<OpaqueMessage> {
        None
    }
}

/// Why the model stopped generating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model is waiting for tool results.
    ToolCalls,
    /// The model has finished its answer.
    Stop,
}

/// A tool call requested by the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// The identifier the tool result must refer to.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The decoded JSON arguments.
    pub arguments: Value,
}

/// The event from a model response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelResponseEvent {
    /// The response has been completed.
    Completed(ModelFinishReason),
    /// A piece of assistant text.
    MessageDelta(String),
    /// A complete tool call request.
    ToolCall(ToolCallRequest),
}
