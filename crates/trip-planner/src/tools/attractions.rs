use std::future::ready;

use trip_planner_core::tool::{Tool, ToolResult};

use crate::advisory::ai_suggest_attractions;

/// Asks the model to draw on what it knows about the city's sights.
#[derive(Default)]
pub struct AttractionsTool;

impl Tool for AttractionsTool {
    fn name(&self) -> &str {
        "tourist_attractions"
    }

    fn description(&self) -> &str {
        "Suggest top attractions for a city based on AI knowledge (no API)."
    }

    fn invoke(
        &self,
        input: String,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(ai_suggest_attractions(&input)))
    }
}
