use std::sync::Arc;

use trip_planner_model::ModelProvider;

use super::{Agent, AgentEvent, DEFAULT_MAX_STEPS, EventFn};
use crate::model_client::ModelClient;
use crate::tool::{Registry, Tool};

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    tools: Registry,
    system_prompt: Option<String>,
    max_steps: usize,
    on_event: Option<EventFn>,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            tools: Registry::default(),
            system_prompt: None,
            max_steps: DEFAULT_MAX_STEPS,
            on_event: None,
        }
    }

    /// Sets the system prompt sent ahead of every goal.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Limits how many model requests one run may make. At least one.
    #[inline]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Attaches a callback for progress events.
    #[inline]
    pub fn on_event(
        mut self,
        on_event: impl Fn(AgentEvent) + Send + Sync + 'static,
    ) -> Self {
        self.on_event = Some(Arc::new(on_event));
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent {
        let Self {
            model_client,
            tools,
            system_prompt,
            max_steps,
            on_event,
        } = self;
        debug!("agent ready with tools {:?}", tools.names());
        Agent {
            model_client,
            tools,
            system_prompt,
            max_steps,
            on_event,
        }
    }
}
