//! A scripted, in-process model for tests.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use tokio::time::{Sleep, sleep};
use trip_planner_model::{
    ErrorKind, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent, OpaqueMessage,
};

pub use preset::*;

/// Pause before each streamed event, so responses arrive over time.
const EVENT_DELAY: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

pub struct TestModelResponse {
    turn: usize,
    preset: PresetResponse,
    event_idx: usize,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl ModelResponse for TestModelResponse {
    type Error = crate::Error;

    fn poll_next_event(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let sleep = self
            .sleep
            .get_or_insert_with(|| Box::pin(sleep(EVENT_DELAY)));
        ready!(sleep.as_mut().poll(cx));
        self.sleep = None;

        let idx = self.event_idx;
        let event_count = self.preset.events.len();
        if idx > event_count {
            // Polled after completion.
            return Poll::Ready(Ok(None));
        }
        self.event_idx += 1;

        if idx == event_count {
            let reason = if self.preset.has_tool_call() {
                ModelFinishReason::ToolCalls
            } else {
                ModelFinishReason::Stop
            };
            return Poll::Ready(Ok(Some(ModelResponseEvent::Completed(
                reason,
            ))));
        }

        let event = match &self.preset.events[idx] {
            PresetEvent::MessageDelta(text) => {
                ModelResponseEvent::MessageDelta(text.clone())
            }
            PresetEvent::ToolCall(req) => ModelResponseEvent::ToolCall(req.clone()),
        };
        Poll::Ready(Ok(Some(event)))
    }

    fn make_opaque_message(&self) -> Option<OpaqueMessage> {
        Some(OpaqueMessage::new(
            format!("msg:{}", self.turn),
            self.preset.clone(),
        ))
    }
}

#[derive(Default)]
struct Script {
    responses: VecDeque<PresetResponse>,
    requests: Vec<ModelRequest>,
}

/// A fake model that answers each request with the next scripted turn.
///
/// Every request consumes one [`PresetResponse`], in the order they were
/// pushed. Requesting more turns than scripted fails with
/// [`ErrorKind::Other`]. Clones share the same script, so a test can keep
/// one handle to inspect [`requests`](Self::requests) after handing the
/// other to an agent.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<Script>>,
}

impl TestModelProvider {
    /// Appends an assistant turn to the script.
    #[inline]
    pub fn push_response(&mut self, preset: PresetResponse) {
        self.lock().responses.push_back(preset);
    }

    /// Returns every request received so far.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;
    type Response = TestModelResponse;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let mut script = self.lock();
        script.requests.push(req.clone());
        let turn = script.requests.len();

        let result = match script.responses.pop_front() {
            None => Err(Error {
                message: format!("no scripted response for turn {turn}"),
                kind: ErrorKind::Other,
            }),
            Some(PresetResponse {
                failure: Some(message),
                ..
            }) => Err(Error {
                message,
                kind: ErrorKind::Unavailable,
            }),
            Some(preset) => Ok(TestModelResponse {
                turn,
                preset,
                event_idx: 0,
                sleep: None,
            }),
        };
        ready(result)
    }
}
