//! The protocol spoken between the planning agent and a language model.
//!
//! A model backend (a local Ollama server, a hosted OpenAI-compatible
//! endpoint, or a scripted fake in tests) only needs to implement
//! [`ModelProvider`] to drive the agent. Nothing in here performs I/O; the
//! types only describe requests, streamed response events and the errors a
//! backend may report.

#![deny(missing_docs)]

mod error;
mod opaque;
mod provider;
mod request;
mod response;

pub use error::*;
pub use opaque::*;
pub use provider::*;
pub use request::*;
pub use response::*;
