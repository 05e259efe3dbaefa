//! Runtime configuration, read from the process environment.

use std::env;

use trip_planner_openai_model::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAIConfig, OpenAIConfigBuilder,
};

use crate::error::ConfigError;

/// Default endpoint of the OpenWeatherMap 5 day / 3 hour forecast API.
pub const DEFAULT_WEATHER_BASE_URL: &str =
    "http://api.openweathermap.org/data/2.5";

/// Where the finished itinerary is written, relative to the working
/// directory.
pub const OUTPUT_PATH: &str = "travel_plan.txt";

/// Credential for the weather API. Required.
pub const WEATHER_API_KEY: &str = "WEATHER_API_KEY";
/// Overrides [`DEFAULT_WEATHER_BASE_URL`].
pub const WEATHER_BASE_URL: &str = "WEATHER_BASE_URL";
/// OpenAI-compatible endpoint of the model server.
pub const OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";
/// Model to plan with.
pub const OLLAMA_MODEL: &str = "OLLAMA_MODEL";
/// Bearer token for the model server, if it wants one.
pub const OLLAMA_API_KEY: &str = "OLLAMA_API_KEY";

/// Settings for the weather lookup.
#[derive(Clone, PartialEq, Eq)]
pub struct WeatherConfig {
    /// Sent as the `appid` query parameter.
    pub api_key: String,
    /// API root, without a trailing slash.
    pub base_url: String,
    /// `metric` gives temperatures in °C.
    pub units: String,
}

impl WeatherConfig {
    /// Creates a configuration for the public API with metric units.
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_WEATHER_BASE_URL.to_owned(),
            units: "metric".to_owned(),
        }
    }

    /// Points the lookup at another server.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("units", &self.units)
            .finish()
    }
}

/// Everything the planner needs to start.
#[derive(Clone, Debug)]
pub struct Config {
    /// Weather lookup settings.
    pub weather: WeatherConfig,
    /// Model backend settings.
    pub model: OpenAIConfig,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a local `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable
    /// name to its value. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_key = get(WEATHER_API_KEY)
            .ok_or(ConfigError::Missing(WEATHER_API_KEY))?;
        let mut weather = WeatherConfig::new(api_key);
        if let Some(base_url) = get(WEATHER_BASE_URL) {
            let base_url = check_url(WEATHER_BASE_URL, base_url)?;
            weather = weather.with_base_url(base_url);
        }

        let base_url = match get(OLLAMA_BASE_URL) {
            Some(base_url) => check_url(OLLAMA_BASE_URL, base_url)?,
            None => DEFAULT_BASE_URL.to_owned(),
        };
        let model = OpenAIConfigBuilder::with_api_key(
            get(OLLAMA_API_KEY).unwrap_or_else(|| "ollama".to_owned()),
        )
        .with_base_url(base_url)
        .with_model(
            get(OLLAMA_MODEL).unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
        )
        .build();

        Ok(Self { weather, model })
    }
}

fn check_url(name: &'static str, url: String) -> Result<String, ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url)
    } else {
        Err(ConfigError::Invalid {
            name,
            reason: format!("`{url}` is not an http(s) URL"),
        })
    }
}
