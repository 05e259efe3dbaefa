use trip_planner_core::tool::{Error as ToolError, Tool, ToolResult};

use crate::weather::WeatherClient;

/// The three fields of a `city|start_date|end_date` query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeatherQuery<'a> {
    /// Destination city.
    pub city: &'a str,
    /// First day, as typed by the user.
    pub start_date: &'a str,
    /// Last day, as typed by the user.
    pub end_date: &'a str,
}

impl<'a> WeatherQuery<'a> {
    /// Splits `input` on `|`.
    ///
    /// Fields are taken positionally and are not trimmed. Anything after
    /// the third field is ignored.
    pub fn parse(input: &'a str) -> Result<Self, ToolError> {
        let mut fields = input.split('|');
        match (fields.next(), fields.next(), fields.next()) {
            (Some(city), Some(start_date), Some(end_date)) => Ok(Self {
                city,
                start_date,
                end_date,
            }),
            _ => Err(ToolError::invalid_input().with_reason(format!(
                "expected `city|start_date|end_date`, got {input:?}"
            ))),
        }
    }
}

/// Looks up the forecast for a city and date range.
pub struct WeatherInfoTool {
    client: WeatherClient,
}

impl WeatherInfoTool {
    /// Creates the tool on top of a weather client.
    #[inline]
    pub fn new(client: WeatherClient) -> Self {
        Self { client }
    }
}

impl Tool for WeatherInfoTool {
    fn name(&self) -> &str {
        "weather_info"
    }

    fn description(&self) -> &str {
        "Get weather forecast. Format: city|start_date|end_date"
    }

    #[allow(clippy::manual_async_fn)]
    fn invoke(
        &self,
        input: String,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let query = WeatherQuery::parse(&input)?;
            Ok(client
                .get_weather(query.city, query.start_date, query.end_date)
                .await)
        }
    }
}

#[cfg(test)]
mod tests {
    use trip_planner_core::tool::ErrorKind;

    use super::*;
    use crate::config::WeatherConfig;

    #[test]
    fn test_parse_query() {
        let query = WeatherQuery::parse("Rome|2024-06-10|2024-06-12").unwrap();
        assert_eq!(
            query,
            WeatherQuery {
                city: "Rome",
                start_date: "2024-06-10",
                end_date: "2024-06-12",
            }
        );
    }

    #[test]
    fn test_parse_keeps_whitespace_and_drops_extra_fields() {
        let query =
            WeatherQuery::parse(" Rome | 2024-06-10|2024-06-12|x").unwrap();
        assert_eq!(query.city, " Rome ");
        assert_eq!(query.start_date, " 2024-06-10");
        assert_eq!(query.end_date, "2024-06-12");
    }

    #[test]
    fn test_parse_too_few_fields() {
        for input in ["Rome", "Rome|2024-06-10", ""] {
            let err = WeatherQuery::parse(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
    }

    #[tokio::test]
    async fn test_invoke_rejects_bad_input() {
        let tool = WeatherInfoTool::new(WeatherClient::new(
            WeatherConfig::new("key").with_base_url("http://127.0.0.1:1"),
        ));
        let err = tool.invoke("Rome|2024-06-10".to_owned()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_invoke_recovers_lookup_failure() {
        let tool = WeatherInfoTool::new(WeatherClient::new(
            WeatherConfig::new("key").with_base_url("http://127.0.0.1:1"),
        ));
        let output = tool
            .invoke("Rome|2024-06-10|2024-06-12".to_owned())
            .await
            .unwrap();
        assert!(output.starts_with("Error fetching weather: "));
    }
}
