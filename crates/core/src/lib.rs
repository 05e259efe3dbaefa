//! The reasoning side of the planner: tools, the tool registry and the
//! model-driven agent loop.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
mod conversation;
mod model_client;
pub mod tool;

pub use agent::{
    Agent, AgentBuilder, AgentEvent, DEFAULT_MAX_STEPS, Error, Reasoner,
};
