use std::fmt::{self, Display};
use std::path::Path;

use trip_planner_core::{Agent, AgentBuilder, AgentEvent, Reasoner};
use trip_planner_model::ModelProvider;

use crate::config::WeatherConfig;
use crate::error::PlanError;
use crate::tools::*;
use crate::weather::WeatherClient;

const SYSTEM_PROMPT: &str = include_str!("./system_prompt.md");

/// A trip as the user asked for it. Dates are kept as typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TripRequest {
    /// Destination city.
    pub city: String,
    /// First day of the trip.
    pub start_date: String,
    /// Last day of the trip.
    pub end_date: String,
}

impl TripRequest {
    /// Creates a request.
    pub fn new(
        city: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// Returns the goal handed to the reasoner.
    pub fn goal(&self) -> String {
        format!(
            "Plan a 3-day trip to {}. Use weather ({} to {}) and suggest \
             attractions and routes. Give a detailed itinerary.",
            self.city, self.start_date, self.end_date
        )
    }
}

/// The reasoner's answer for a [`TripRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Itinerary {
    /// What was asked for.
    pub request: TripRequest,
    /// The plan, verbatim.
    pub plan: String,
}

impl Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let TripRequest {
            city,
            start_date,
            end_date,
        } = &self.request;
        write!(
            f,
            "Trip Plan for {city} ({start_date} to {end_date}):\n\n{}",
            self.plan
        )
    }
}

/// Asks `reasoner` for an itinerary.
pub async fn plan_trip<R: Reasoner>(
    reasoner: &R,
    request: TripRequest,
) -> Result<Itinerary, PlanError> {
    let goal = request.goal();
    info!("planning: {goal}");
    let plan = reasoner.run(&goal).await?;
    Ok(Itinerary { request, plan })
}

/// Writes the itinerary to `path`, replacing whatever was there.
pub async fn save_itinerary(
    itinerary: &Itinerary,
    path: impl AsRef<Path>,
) -> Result<(), PlanError> {
    let path = path.as_ref();
    tokio::fs::write(path, itinerary.to_string())
        .await
        .map_err(|source| PlanError::Save {
            path: path.to_owned(),
            source,
        })?;
    debug!("itinerary written to {}", path.display());
    Ok(())
}

/// A planner builder.
///
/// See [`Planner`].
pub struct PlannerBuilder {
    agent_builder: AgentBuilder,
    weather: WeatherConfig,
    system_prompt: String,
}

impl PlannerBuilder {
    /// Creates a planner builder with a model provider and the weather
    /// lookup settings.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
        weather: WeatherConfig,
    ) -> Self {
        Self {
            agent_builder: AgentBuilder::with_model_provider(provider),
            weather,
            system_prompt: SYSTEM_PROMPT.to_owned(),
        }
    }

    /// Replaces the built-in system prompt.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Limits how many model requests one plan may take.
    #[inline]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.agent_builder = self.agent_builder.with_max_steps(max_steps);
        self
    }

    /// Attaches a callback for progress events.
    #[inline]
    pub fn on_event(
        mut self,
        on_event: impl Fn(AgentEvent) + Send + Sync + 'static,
    ) -> Self {
        self.agent_builder = self.agent_builder.on_event(on_event);
        self
    }

    /// Builds a new planner.
    pub fn build(self) -> Planner {
        let agent = self
            .agent_builder
            .with_system_prompt(self.system_prompt)
            .with_tool(WeatherInfoTool::new(WeatherClient::new(self.weather)))
            .with_tool(AttractionsTool)
            .with_tool(RoutesTool)
            .build();

        Planner { agent }
    }
}

/// An [`Agent`] equipped with the travel tools.
pub struct Planner {
    agent: Agent,
}

impl Planner {
    /// Returns the underlying agent.
    #[inline]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

impl Reasoner for Planner {
    #[inline]
    fn run(
        &self,
        goal: &str,
    ) -> impl Future<Output = Result<String, trip_planner_core::Error>> + Send
    {
        self.agent.run(goal)
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use trip_planner_core::Error as AgentError;
    use trip_planner_test_model::TestModelProvider;

    use super::*;

    struct Echo;

    impl Reasoner for Echo {
        fn run(
            &self,
            goal: &str,
        ) -> impl Future<Output = Result<String, AgentError>> + Send {
            ready(Ok(format!("echo: {goal}")))
        }
    }

    struct Stuck;

    impl Reasoner for Stuck {
        fn run(
            &self,
            _goal: &str,
        ) -> impl Future<Output = Result<String, AgentError>> + Send {
            ready(Err(AgentError::StepLimitExceeded(3)))
        }
    }

    #[test]
    fn test_goal() {
        let request = TripRequest::new("Tokyo", "2024-07-01", "2024-07-03");
        assert_eq!(
            request.goal(),
            "Plan a 3-day trip to Tokyo. Use weather (2024-07-01 to \
             2024-07-03) and suggest attractions and routes. Give a detailed \
             itinerary."
        );
    }

    #[test]
    fn test_itinerary_header() {
        let itinerary = Itinerary {
            request: TripRequest::new("Paris", "2024-05-01", "2024-05-03"),
            plan: "Day 1: Louvre".to_owned(),
        };
        assert_eq!(
            itinerary.to_string(),
            "Trip Plan for Paris (2024-05-01 to 2024-05-03):\n\nDay 1: Louvre"
        );
    }

    #[tokio::test]
    async fn test_plan_trip() {
        let request = TripRequest::new("Oslo", "a", "b");
        let itinerary = plan_trip(&Echo, request.clone()).await.unwrap();
        assert_eq!(itinerary.request, request);
        assert_eq!(itinerary.plan, format!("echo: {}", request.goal()));

        let err = plan_trip(&Stuck, request).await.unwrap_err();
        assert!(matches!(err, PlanError::Agent(_)));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.txt");
        std::fs::write(&path, "an older, much longer plan").unwrap();

        let itinerary = Itinerary {
            request: TripRequest::new("Rome", "x", "y"),
            plan: "short".to_owned(),
        };
        save_itinerary(&itinerary, &path).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Trip Plan for Rome (x to y):\n\nshort"
        );
    }

    #[tokio::test]
    async fn test_save_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("plan.txt");
        let itinerary = Itinerary {
            request: TripRequest::new("Rome", "x", "y"),
            plan: String::new(),
        };
        let err = save_itinerary(&itinerary, &path).await.unwrap_err();
        assert!(matches!(err, PlanError::Save { path: p, .. } if p == path));
    }

    #[test]
    fn test_registered_tools() {
        let planner = PlannerBuilder::with_model_provider(
            TestModelProvider::default(),
            WeatherConfig::new("key"),
        )
        .build();
        assert_eq!(
            planner.agent().tools().names(),
            ["weather_info", "tourist_attractions", "travel_routes"]
        );
    }
}
