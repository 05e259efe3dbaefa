use serde_json::json;
use trip_planner::config::WeatherConfig;
use trip_planner::core::{AgentEvent, Error as AgentError};
use trip_planner::{
    PlanError, PlannerBuilder, TripRequest, plan_trip, save_itinerary,
};
use trip_planner_model::{ModelMessage, ToolCallRequest};
use trip_planner_test_model::{PresetEvent, PresetResponse, TestModelProvider};

const ANSWER: &str = "Day 1: Senso-ji and Asakusa.\nDay 2: Meiji Shrine.\n\
                      Day 3: Tsukiji outer market.";

fn tool_call(id: &str, name: &str, input: &str) -> PresetEvent {
    PresetEvent::ToolCall(ToolCallRequest {
        id: id.to_owned(),
        name: name.to_owned(),
        arguments: json!({ "input": input }),
    })
}

fn weather() -> WeatherConfig {
    WeatherConfig::new("test-key").with_base_url("http://127.0.0.1:1")
}

#[tokio::test]
async fn test_plan_and_save() {
    let mut provider = TestModelProvider::default();
    provider.push_response(PresetResponse::with_events([
        PresetEvent::MessageDelta("Let me gather some facts.".to_owned()),
        tool_call("call_1", "weather_info", "Tokyo|2024-07-01|2024-07-03"),
        tool_call("call_2", "tourist_attractions", "Tokyo"),
        tool_call("call_3", "travel_routes", "Tokyo"),
    ]));
    provider.push_response(PresetResponse::answer(ANSWER));

    let events = std::sync::Arc::new(std::sync::Mutex::new(vec![]));
    let planner =
        PlannerBuilder::with_model_provider(provider.clone(), weather())
            .on_event({
                let events = events.clone();
                move |event| events.lock().unwrap().push(event)
            })
            .build();

    let request = TripRequest::new("Tokyo", "2024-07-01", "2024-07-03");
    let goal = request.goal();
    for part in ["Tokyo", "2024-07-01", "2024-07-03", "3-day trip"] {
        assert!(goal.contains(part), "{goal:?} lacks {part:?}");
    }

    let itinerary = plan_trip(&planner, request).await.unwrap();
    assert_eq!(itinerary.plan, ANSWER);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tools.len(), 3);
    assert!(
        requests[0]
            .messages
            .iter()
            .any(|msg| matches!(msg, ModelMessage::User(text) if *text == goal))
    );
    let tool_results: Vec<_> = requests[1]
        .messages
        .iter()
        .filter_map(|msg| match msg {
            ModelMessage::Tool(result) => {
                Some((result.id.as_str(), result.content.as_str()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(tool_results.len(), 3);
    assert_eq!(tool_results[0].0, "call_1");
    assert!(tool_results[0].1.starts_with("Error fetching weather: "));
    assert_eq!(
        tool_results[1],
        (
            "call_2",
            "Suggesting top 5 attractions in Tokyo based on AI knowledge ."
        )
    );
    assert_eq!(
        tool_results[2],
        (
            "call_3",
            "Recommended transport in Tokyo: Metro, Taxi, Bus services, and \
             ride-hailing apps (Uber/Bolt)."
        )
    );

    let tool_names: Vec<_> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            AgentEvent::ToolCall { name, .. } => Some(name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        tool_names,
        ["weather_info", "tourist_attractions", "travel_routes"]
    );

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("travel_plan.txt");
    save_itinerary(&itinerary, &path).await.unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        format!("Trip Plan for Tokyo (2024-07-01 to 2024-07-03):\n\n{ANSWER}")
    );
}

#[tokio::test]
async fn test_malformed_weather_query_fails() {
    let mut provider = TestModelProvider::default();
    provider.push_response(PresetResponse::with_events([tool_call(
        "call_1",
        "weather_info",
        "Tokyo 2024-07-01",
    )]));
    provider.push_response(PresetResponse::answer("unreachable"));

    let planner =
        PlannerBuilder::with_model_provider(provider.clone(), weather())
            .build();
    let request = TripRequest::new("Tokyo", "2024-07-01", "2024-07-03");

    let err = plan_trip(&planner, request).await.unwrap_err();
    match err {
        PlanError::Agent(AgentError::Tool { name, input, .. }) => {
            assert_eq!(name, "weather_info");
            assert_eq!(input, "Tokyo 2024-07-01");
        }
        err => panic!("unexpected error: {err}"),
    }
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn test_model_failure_is_fatal() {
    let mut provider = TestModelProvider::default();
    provider.push_response(PresetResponse::failing("connection refused"));

    let planner =
        PlannerBuilder::with_model_provider(provider, weather()).build();
    let request = TripRequest::new("Tokyo", "2024-07-01", "2024-07-03");

    let err = plan_trip(&planner, request).await.unwrap_err();
    assert!(matches!(err, PlanError::Agent(AgentError::Model(_))));
}
