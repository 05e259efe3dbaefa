//! A travel planner that lets a language model combine weather forecasts
//! and local advice into an itinerary.
//!
//! The crate ships a CLI for the terminal. The pieces are also usable as a
//! library: build a [`Planner`] with [`PlannerBuilder`] and hand it to
//! [`plan_trip`].

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod advisory;
pub mod config;
mod error;
mod planner;
pub mod prompt;
pub mod tools;
pub mod weather;

pub use config::Config;
pub use error::{ConfigError, PlanError};
pub use planner::{
    Itinerary, Planner, PlannerBuilder, TripRequest, plan_trip, save_itinerary,
};

/// Re-exports of [`trip_planner_core`] crate.
pub mod core {
    pub use trip_planner_core::*;
}
