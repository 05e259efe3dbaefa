use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use serde_json::Value;
use trip_planner_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    OpaqueMessage, ToolCallRequest,
};

use crate::Error;
use crate::io::Sse;
use crate::proto::{ChatCompletionChunk, FunctionCall, Message, ToolCall};

/// Everything assembled from the stream so far.
struct PartialState {
    sse: Sse,
    id: Option<String>,
    content: String,
    tool_calls: Vec<ToolCall>,
    // Events are handed out in this order: text delta, tool calls, finish.
    pending_delta: Option<String>,
    // Indices into `tool_calls`. Tool call arguments arrive in fragments, so
    // calls only become ready once the model reports why it stopped.
    ready_tool_calls: VecDeque<usize>,
    tool_calls_flushed: bool,
    pending_finish_reason: Option<ModelFinishReason>,
    stream_ended: bool,
}

impl PartialState {
    fn new(sse: Sse) -> Self {
        Self {
            sse,
            id: None,
            content: String::new(),
            tool_calls: Vec::new(),
            pending_delta: None,
            ready_tool_calls: VecDeque::new(),
            tool_calls_flushed: false,
            pending_finish_reason: None,
            stream_ended: false,
        }
    }

    fn pop_pending(&mut self) -> Option<ModelResponseEvent> {
        if let Some(delta) = self.pending_delta.take() {
            return Some(ModelResponseEvent::MessageDelta(delta));
        }
        if let Some(idx) = self.ready_tool_calls.pop_front() {
            let request = tool_call_request(&self.tool_calls[idx]);
            return Some(ModelResponseEvent::ToolCall(request));
        }
        self.pending_finish_reason
            .take()
            .map(ModelResponseEvent::Completed)
    }

    fn flush_tool_calls(&mut self) {
        if self.tool_calls_flushed {
            return;
        }
        self.tool_calls_flushed = true;
        // Replayed tool results are matched to these calls by id.
        for (idx, call) in self.tool_calls.iter_mut().enumerate() {
            if call.id.as_deref().is_none_or(str::is_empty) {
                call.id = Some(format!("call_{idx}"));
            }
        }
        self.ready_tool_calls.extend(0..self.tool_calls.len());
    }

    fn apply_chunk(&mut self, chunk: ChatCompletionChunk) -> Result<(), Error> {
        if *self.id.get_or_insert_with(|| chunk.id.clone()) != chunk.id {
            return Err(Error::new(
                "chunk id mismatch",
                ErrorKind::InvalidResponse,
            ));
        }

        for choice in chunk.choices {
            if let Some(content) = choice.delta.content.filter(|c| !c.is_empty())
            {
                self.content.push_str(&content);
                self.pending_delta
                    .get_or_insert_with(String::new)
                    .push_str(&content);
            }
            for fragment in choice.delta.tool_calls.into_iter().flatten() {
                self.merge_tool_call(fragment);
            }
            if let Some(reason) = choice.finish_reason {
                let reason = if reason == "tool_calls" || !self.tool_calls.is_empty()
                {
                    ModelFinishReason::ToolCalls
                } else {
                    ModelFinishReason::Stop
                };
                self.flush_tool_calls();
                self.pending_finish_reason = Some(reason);
            }
        }
        Ok(())
    }

    fn merge_tool_call(&mut self, fragment: ToolCall) {
        let existing = fragment.index.and_then(|index| {
            self.tool_calls
                .iter_mut()
                .find(|call| call.index == Some(index))
        });
        let Some(call) = existing else {
            self.tool_calls.push(fragment);
            return;
        };

        if let Some(id) = fragment.id {
            call.id.get_or_insert_default().push_str(&id);
        }
        if let Some(ty) = fragment.r#type {
            call.r#type = Some(ty);
        }
        let Some(function) = fragment.function else {
            return;
        };
        let target = call.function.get_or_insert(FunctionCall {
            name: None,
            arguments: None,
        });
        if let Some(name) = function.name {
            target.name.get_or_insert_default().push_str(&name);
        }
        if let Some(arguments) = function.arguments {
            target.arguments.get_or_insert_default().push_str(&arguments);
        }
    }

    fn finish(self) -> Option<(String, Message)> {
        let id = self.id?;
        let tool_calls = (!self.tool_calls.is_empty()).then_some(self.tool_calls);
        Some((
            id,
            Message::Assistant {
                content: Some(self.content),
                tool_calls,
            },
        ))
    }
}

fn tool_call_request(call: &ToolCall) -> ToolCallRequest {
    let function = call.function.as_ref();
    let raw_arguments = function
        .and_then(|f| f.arguments.as_deref())
        .map(str::trim)
        .unwrap_or_default();
    let arguments = if raw_arguments.is_empty() {
        Value::Null
    } else {
        // Keep undecodable arguments as text, the tool may still make
        // sense of them.
        serde_json::from_str(raw_arguments)
            .unwrap_or_else(|_| Value::String(raw_arguments.to_owned()))
    };
    ToolCallRequest {
        id: call.id.clone().unwrap_or_default(),
        name: function.and_then(|f| f.name.clone()).unwrap_or_default(),
        arguments,
    }
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<ModelResponseEvent>, PartialState), Error>;

pin_project! {
    /// A streamed chat completion.
    pub struct OpenAIResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
        full_msg: Option<(String, Message)>,
    }
}

impl OpenAIResponse {
    #[inline]
    pub(crate) fn from_sse(sse: Sse) -> Self {
        let state = PartialState::new(sse);
        Self {
            next_event_fut: Some(Box::pin(next_event(state))),
            full_msg: None,
        }
    }
}

impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let result = ready!(next_event_fut.as_mut().poll(cx));
        *this.next_event_fut = None;

        match result {
            Ok((Some(event), state)) => {
                *this.next_event_fut = Some(Box::pin(next_event(state)));
                Poll::Ready(Ok(Some(event)))
            }
            Ok((None, state)) => {
                *this.full_msg = state.finish();
                Poll::Ready(Ok(None))
            }
            Err(err) => Poll::Ready(Err(err)),
        }
    }

    fn make_opaque_message(&self) -> Option<OpaqueMessage> {
        self.full_msg
            .as_ref()
            .map(|(id, msg)| OpaqueMessage::new(id.clone(), msg.clone()))
    }
}

async fn next_event(mut state: PartialState) -> NextEvent {
    loop {
        if let Some(event) = state.pop_pending() {
            return Ok((Some(event), state));
        }
        if state.stream_ended {
            return Ok((None, state));
        }

        let data = match state.sse.next_event().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                // The server hung up without `[DONE]`; hand out whatever
                // tool calls were assembled.
                state.stream_ended = true;
                state.flush_tool_calls();
                continue;
            }
            Err(err) => {
                return Err(Error::new(
                    format!("broken event stream: {err:?}"),
                    ErrorKind::Unavailable,
                ));
            }
        };
        trace!("got sse event: {data}");
        if data == "[DONE]" {
            state.stream_ended = true;
            state.flush_tool_calls();
            continue;
        }

        let chunk = serde_json::from_str::<ChatCompletionChunk>(&data)
            .map_err(|err| {
                Error::new(format!("{err}"), ErrorKind::InvalidResponse)
            })?;
        state.apply_chunk(chunk)?;
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use bytes::Bytes;
    use serde_json::json;

    use trip_planner_model::ModelProviderError;

    use super::*;
    use crate::io::Chunks;

    async fn drain(
        chunks: Chunks,
    ) -> (Vec<ModelResponseEvent>, Option<OpaqueMessage>) {
        let mut resp = pin!(OpenAIResponse::from_sse(Sse::new(chunks)));
        let mut events = vec![];
        while let Some(event) = poll_fn(|cx| resp.as_mut().poll_next_event(cx))
            .await
            .unwrap()
        {
            events.push(event);
        }
        (events, resp.make_opaque_message())
    }

    #[tokio::test]
    async fn test_tool_call_stream() {
        let chunks = Chunks::from_fixture([Bytes::from_static(
            include_bytes!("../fixtures/tool_call_stream.txt"),
        )]);
        let (events, opaque) = drain(chunks).await;

        assert_eq!(
            events,
            vec![
                ModelResponseEvent::MessageDelta("Checking ".to_owned()),
                ModelResponseEvent::MessageDelta("the forecast.".to_owned()),
                ModelResponseEvent::ToolCall(ToolCallRequest {
                    id: "call_weather".to_owned(),
                    name: "weather_info".to_owned(),
                    arguments: json!({ "input": "Rome|2024-06-10|2024-06-12" }),
                }),
                ModelResponseEvent::ToolCall(ToolCallRequest {
                    id: "call_routes".to_owned(),
                    name: "travel_routes".to_owned(),
                    arguments: json!({ "input": "Rome" }),
                }),
                ModelResponseEvent::Completed(ModelFinishReason::ToolCalls),
            ]
        );

        let opaque = opaque.unwrap();
        assert_eq!(opaque.id(), "chatcmpl-412");
        let Some(Message::Assistant {
            content,
            tool_calls: Some(tool_calls),
        }) = opaque.to_raw::<Message>()
        else {
            panic!("unexpected opaque message");
        };
        assert_eq!(content.as_deref(), Some("Checking the forecast."));
        assert_eq!(tool_calls.len(), 2);
    }

    #[tokio::test]
    async fn test_plain_answer_and_usage_chunk() {
        let chunks = Chunks::from_fixture([
            Bytes::from_static(
                br#"data: {"id":"chatcmpl-9","choices":[{"index":0,"delta":{"role":"assistant","content":"Day 1: Shibuya."},"finish_reason":null}]}

"#,
            ),
            Bytes::from_static(
                br#"data: {"id":"chatcmpl-9","choices":[{"index":0,"delta":{"role":"assistant","content":""},"finish_reason":"stop"}]}

data: {"id":"chatcmpl-9","choices":[],"usage":{"prompt_tokens":9,"completion_tokens":4}}

data: [DONE]

"#,
            ),
        ]);
        let (events, opaque) = drain(chunks).await;
        assert_eq!(
            events,
            vec![
                ModelResponseEvent::MessageDelta("Day 1: Shibuya.".to_owned()),
                ModelResponseEvent::Completed(ModelFinishReason::Stop),
            ]
        );
        assert!(opaque.is_some());
    }

    #[tokio::test]
    async fn test_tool_call_without_id() {
        let chunks = Chunks::from_fixture([Bytes::from_static(
            br#"data: {"id":"chatcmpl-7","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"type":"function","function":{"name":"tourist_attractions","arguments":"{\"input\":\"Oslo\"}"}}]},"finish_reason":"tool_calls"}]}

data: [DONE]

"#,
        )]);
        let (events, opaque) = drain(chunks).await;
        assert_eq!(
            events[0],
            ModelResponseEvent::ToolCall(ToolCallRequest {
                id: "call_0".to_owned(),
                name: "tourist_attractions".to_owned(),
                arguments: json!({ "input": "Oslo" }),
            })
        );

        // The replayed message must carry the same id as the tool result.
        let opaque = opaque.unwrap();
        let Some(Message::Assistant {
            tool_calls: Some(tool_calls),
            ..
        }) = opaque.to_raw::<Message>()
        else {
            panic!("unexpected opaque message");
        };
        assert_eq!(tool_calls[0].id.as_deref(), Some("call_0"));
    }

    #[tokio::test]
    async fn test_malformed_chunk() {
        let chunks =
            Chunks::from_fixture([Bytes::from_static(b"data: {oops}\n\n")]);
        let mut resp = pin!(OpenAIResponse::from_sse(Sse::new(chunks)));
        let err = poll_fn(|cx| resp.as_mut().poll_next_event(cx))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }
}
