use std::future::ready;

use trip_planner_core::tool::{Tool, ToolResult};

use crate::advisory::get_routes;

/// Suggests how to get around a city.
#[derive(Default)]
pub struct RoutesTool;

impl Tool for RoutesTool {
    fn name(&self) -> &str {
        "travel_routes"
    }

    fn description(&self) -> &str {
        "Get recommended transportation methods for a city."
    }

    fn invoke(
        &self,
        input: String,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(get_routes(&input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::ai_suggest_attractions;
    use crate::tools::AttractionsTool;

    #[tokio::test]
    async fn test_advisory_tools() {
        assert_eq!(
            RoutesTool.invoke("Oslo".to_owned()).await.unwrap(),
            get_routes("Oslo")
        );
        assert_eq!(
            AttractionsTool.invoke("Oslo".to_owned()).await.unwrap(),
            ai_suggest_attractions("Oslo")
        );
    }
}
