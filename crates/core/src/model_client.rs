use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;

use tracing::Instrument;
use trip_planner_model::{
    ModelFinishReason, ModelProvider, ModelProviderError, ModelRequest,
    ModelResponse, ModelResponseEvent, OpaqueMessage, ToolCallRequest,
};

pub(crate) type DeltaFn = Arc<dyn Fn(&str) + Send + Sync>;

type SendRequestResult =
    Result<ModelClientResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
#[rustfmt::skip]
type HandlerFn = Arc<
    dyn Fn(ModelRequest, Option<DeltaFn>) -> BoxedSendRequestFuture
        + Send + Sync
>;

/// A type-erased handle to a model provider that drains each streamed
/// response into a [`ModelClientResponse`].
#[derive(Clone)]
pub(crate) struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // Erase `P` so the agent does not need a type parameter.
        let handler_fn: HandlerFn = Arc::new(
            move |req: ModelRequest, on_delta: Option<DeltaFn>| {
                let fut = provider.send_request(&req);
                let fut = async move {
                    trace!("sending a request: {req:?}");
                    collect_response::<P>(fut.await, on_delta).await
                };
                Box::pin(fut.instrument(debug_span!("model request")))
                    as BoxedSendRequestFuture
            },
        );
        Self { handler_fn }
    }

    /// Sends a request and waits for the complete response.
    ///
    /// `on_delta` sees every piece of assistant text as it streams in.
    #[inline]
    pub async fn send_request(
        &self,
        req: ModelRequest,
        on_delta: Option<DeltaFn>,
    ) -> SendRequestResult {
        (self.handler_fn)(req, on_delta).await
    }
}

/// A completely received response from the model client.
#[derive(Clone, Debug)]
pub(crate) struct ModelClientResponse {
    pub transcript: String,
    pub opaque_msg: Option<OpaqueMessage>,
    pub tool_calls: Vec<ToolCallRequest>,
    pub finish_reason: Option<ModelFinishReason>,
}

async fn collect_response<P: ModelProvider + 'static>(
    resp_or_err: Result<P::Response, P::Error>,
    on_delta: Option<DeltaFn>,
) -> SendRequestResult {
    let resp = resp_or_err.map_err(|err| {
        error!("request failed: {err}");
        Box::new(err) as Box<dyn ModelProviderError>
    })?;

    let mut transcript = String::new();
    let mut tool_calls = Vec::new();
    let mut finish_reason = None;

    let mut resp = pin!(resp);
    loop {
        let event = poll_fn(|cx| resp.as_mut().poll_next_event(cx))
            .await
            .map_err(|err| {
                error!("response failed: {err}");
                Box::new(err) as Box<dyn ModelProviderError>
            })?;
        let Some(event) = event else {
            break;
        };
        trace!("got an event: {event:?}");

        match event {
            ModelResponseEvent::MessageDelta(delta) => {
                if let Some(on_delta) = &on_delta {
                    on_delta(&delta);
                }
                transcript.push_str(&delta);
            }
            ModelResponseEvent::ToolCall(req) => tool_calls.push(req),
            ModelResponseEvent::Completed(reason) => {
                finish_reason = Some(reason);
            }
        }
    }

    debug!(
        "response finished ({finish_reason:?}) with {} tool calls",
        tool_calls.len()
    );
    Ok(ModelClientResponse {
        transcript,
        opaque_msg: resp.make_opaque_message(),
        tool_calls,
        finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use trip_planner_model::ModelMessage;
    use trip_planner_test_model::{
        PresetEvent, PresetResponse, TestModelProvider,
    };

    use super::*;

    fn goal() -> ModelRequest {
        ModelRequest {
            messages: vec![ModelMessage::User("Plan Tokyo".to_owned())],
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn test_send_request() {
        let mut model_provider = TestModelProvider::default();
        model_provider.push_response(PresetResponse::with_events([
            PresetEvent::MessageDelta("Day 1: ".to_owned()),
            PresetEvent::MessageDelta("Asakusa.".to_owned()),
        ]));
        let model_client = ModelClient::new(model_provider);

        let deltas = Arc::new(Mutex::new(Vec::<String>::new()));
        let on_delta: DeltaFn = {
            let deltas = Arc::clone(&deltas);
            Arc::new(move |delta: &str| {
                deltas.lock().unwrap().push(delta.to_owned());
            })
        };
        let resp = model_client
            .send_request(goal(), Some(on_delta))
            .await
            .unwrap();

        assert_eq!(resp.transcript, "Day 1: Asakusa.");
        assert!(resp.opaque_msg.is_some());
        assert!(resp.tool_calls.is_empty());
        assert_eq!(resp.finish_reason, Some(ModelFinishReason::Stop));
        assert_eq!(*deltas.lock().unwrap(), vec!["Day 1: ", "Asakusa."]);
    }

    #[tokio::test]
    async fn test_error_handling() {
        let model_client = ModelClient::new(TestModelProvider::default());
        let resp_or_err = model_client.send_request(goal(), None).await;
        assert!(resp_or_err.is_err());
    }
}
