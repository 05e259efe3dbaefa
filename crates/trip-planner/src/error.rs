use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while assembling the planner from its environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set (or is blank).
    #[error("environment variable `{0}` is not set")]
    Missing(&'static str),
    /// A variable is set but unusable.
    #[error("environment variable `{name}` is invalid: {reason}")]
    Invalid {
        /// Name of the variable.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors that end a planning run.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The reasoning agent gave up.
    #[error(transparent)]
    Agent(#[from] trip_planner_core::Error),
    /// The itinerary could not be written.
    #[error("failed to write itinerary to {}", path.display())]
    Save {
        /// Where the itinerary was supposed to go.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}
