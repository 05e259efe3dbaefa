//! The tools handed to the planning agent.

mod attractions;
mod routes;
mod weather_info;

pub use attractions::AttractionsTool;
pub use routes::RoutesTool;
pub use weather_info::{WeatherInfoTool, WeatherQuery};
