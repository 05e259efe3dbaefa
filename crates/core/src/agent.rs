mod builder;

use std::sync::Arc;

use thiserror::Error as ThisError;
use tracing::Instrument;
use trip_planner_model::{
    ModelFinishReason, ModelMessage, ModelProviderError, ToolCallRequest,
    ToolCallResult,
};

use crate::conversation::Conversation;
use crate::model_client::{DeltaFn, ModelClient};
use crate::tool::{self, ErrorKind as ToolErrorKind, Registry, decode_input};
pub use builder::AgentBuilder;

/// Upper bound on model round trips in one run.
pub const DEFAULT_MAX_STEPS: usize = 15;

/// Something that turns a natural-language goal into a final answer.
///
/// The planner only depends on this trait. [`Agent`] implements it with a
/// model-driven tool loop; tests and other front ends may swap in anything
/// else.
pub trait Reasoner: Send + Sync {
    /// Works on `goal` until there is a final answer.
    fn run(
        &self,
        goal: &str,
    ) -> impl Future<Output = Result<String, Error>> + Send;
}

/// Errors that end an agent run.
#[derive(Debug, ThisError)]
pub enum Error {
    /// The model backend failed.
    #[error("model request failed: {0}")]
    Model(Box<dyn ModelProviderError>),
    /// A tool refused the input the model gave it.
    #[error("tool `{name}` failed on input {input:?}: {source}")]
    Tool {
        /// Name of the tool.
        name: String,
        /// The input the model passed.
        input: String,
        /// What the tool reported.
        #[source]
        source: tool::Error,
    },
    /// The model kept calling tools without producing an answer.
    #[error("no final answer after {0} model steps")]
    StepLimitExceeded(usize),
}

/// Progress notifications emitted while an agent runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentEvent {
    /// A piece of assistant text streamed in.
    MessageDelta(String),
    /// The agent is about to call a tool.
    ToolCall {
        /// Name of the tool.
        name: String,
        /// The textual input for the tool.
        input: String,
    },
    /// A tool call has finished.
    ToolOutput {
        /// Name of the tool.
        name: String,
        /// What goes back to the model.
        output: String,
    },
}

pub(crate) type EventFn = Arc<dyn Fn(AgentEvent) + Send + Sync>;

/// A model-driven agent: it sends the goal to the model, runs whatever
/// tools the model asks for, feeds the results back and repeats until the
/// model answers without calling a tool.
///
/// Tool calls run one after another, in the order the model listed them.
pub struct Agent {
    model_client: ModelClient,
    tools: Registry,
    system_prompt: Option<String>,
    max_steps: usize,
    on_event: Option<EventFn>,
}

impl Agent {
    /// Returns the registered tools.
    #[inline]
    pub fn tools(&self) -> &Registry {
        &self.tools
    }

    fn emit(&self, event: AgentEvent) {
        if let Some(on_event) = &self.on_event {
            on_event(event);
        }
    }

    async fn drive(&self, goal: String) -> Result<String, Error> {
        let mut conversation = Conversation::default();
        if let Some(prompt) = &self.system_prompt {
            conversation
                .push(ModelMessage::System(prompt.clone()), prompt.as_str());
        }
        conversation.push(ModelMessage::User(goal.clone()), goal);

        let on_delta: Option<DeltaFn> = self.on_event.clone().map(|on_event| {
            Arc::new(move |delta: &str| {
                on_event(AgentEvent::MessageDelta(delta.to_owned()));
            }) as DeltaFn
        });

        for step in 1..=self.max_steps {
            let request = conversation.to_request(self.tools.definitions());
            let resp = self
                .model_client
                .send_request(request, on_delta.clone())
                .instrument(debug_span!("agent step", step))
                .await
                .map_err(Error::Model)?;

            let msg = match resp.opaque_msg {
                Some(opaque) => ModelMessage::Opaque(opaque),
                None => ModelMessage::Assistant(resp.transcript.clone()),
            };
            conversation.push(msg, resp.transcript.as_str());

            if resp.tool_calls.is_empty() {
                if resp.finish_reason != Some(ModelFinishReason::Stop) {
                    warn!(
                        "answer ended without a stop signal ({:?})",
                        resp.finish_reason
                    );
                }
                debug!("finished after {step} steps");
                trace!("conversation:\n{}", conversation.transcript());
                return Ok(resp.transcript);
            }

            for call in resp.tool_calls {
                let id = call.id.clone();
                let output = self.call_tool(call).await?;
                conversation.push(
                    ModelMessage::Tool(ToolCallResult {
                        id,
                        content: output.clone(),
                    }),
                    output,
                );
            }
        }

        warn!("giving up after {} steps", self.max_steps);
        Err(Error::StepLimitExceeded(self.max_steps))
    }

    /// Runs one tool call and returns the text for the model.
    ///
    /// Only a tool rejecting its own input ends the run. Unknown tools and
    /// execution failures are reported back so the model can correct
    /// itself.
    async fn call_tool(&self, call: ToolCallRequest) -> Result<String, Error> {
        let ToolCallRequest {
            name, arguments, ..
        } = call;

        let output = match decode_input(arguments) {
            Err(err) => format!(
                "{name} was called with bad arguments: {}",
                err.reason()
            ),
            Ok(input) => {
                self.emit(AgentEvent::ToolCall {
                    name: name.clone(),
                    input: input.clone(),
                });
                match self.tools.invoke(&name, input.clone()) {
                    None => {
                        warn!("model asked for unknown tool `{name}`");
                        format!(
                            "{name} is not a valid tool, try one of [{}].",
                            self.tools.names().join(", ")
                        )
                    }
                    Some(fut) => match fut
                        .instrument(debug_span!("tool", name = %name))
                        .await
                    {
                        Ok(output) => output,
                        Err(err)
                            if err.kind() == ToolErrorKind::InvalidInput =>
                        {
                            return Err(Error::Tool {
                                name,
                                input,
                                source: err,
                            });
                        }
                        Err(err) => {
                            warn!("tool `{name}` failed: {err}");
                            format!("Error: {}", err.reason())
                        }
                    },
                }
            }
        };

        self.emit(AgentEvent::ToolOutput {
            name,
            output: output.clone(),
        });
        Ok(output)
    }
}

impl Reasoner for Agent {
    #[inline]
    fn run(
        &self,
        goal: &str,
    ) -> impl Future<Output = Result<String, Error>> + Send {
        self.drive(goal.to_owned())
    }
}
