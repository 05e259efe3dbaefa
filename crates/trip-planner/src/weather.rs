//! Forecast lookup against the OpenWeatherMap 5 day / 3 hour API.

use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Number, Value};
use thiserror::Error;

use crate::config::WeatherConfig;

/// Returned when the API does not answer with the success code.
pub const NOT_FOUND_MESSAGE: &str =
    "Weather data not found. Please check city name or API key.";

/// Returned when no forecast entry falls on the requested dates.
pub const NO_DATA_MESSAGE: &str =
    "No specific weather data found for the given dates.";

/// Why a lookup could not produce a forecast.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The request failed or the body was not JSON.
    #[error(transparent)]
    Request(reqwest::Error),
    /// The payload did not have the expected shape.
    #[error("unexpected forecast payload: {0}")]
    Payload(#[from] serde_json::Error),
    /// A matching entry had no weather condition.
    #[error("forecast entry `{0}` has no weather description")]
    MissingDescription(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries the API key.
        Self::Request(err.without_url())
    }
}

#[derive(Deserialize)]
struct Forecast {
    list: Vec<RawEntry>,
}

#[derive(Deserialize)]
struct RawEntry {
    dt_txt: String,
    main: Main,
    weather: Vec<Condition>,
}

#[derive(Deserialize)]
struct Main {
    temp: Number,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

/// One timestamped observation from the forecast list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForecastEntry {
    /// `dt_txt` as sent by the API, e.g. `2024-06-10 12:00:00`.
    pub timestamp: String,
    /// Temperature in the configured units, printed as received.
    pub temperature: String,
    /// Description of the first reported condition.
    pub description: String,
}

impl ForecastEntry {
    /// Renders the entry as one line of the forecast summary.
    pub fn to_line(&self) -> String {
        format!(
            "{}: {}°C, {}",
            self.timestamp, self.temperature, self.description
        )
    }
}

impl TryFrom<RawEntry> for ForecastEntry {
    type Error = WeatherError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let Some(condition) = raw.weather.into_iter().next() else {
            return Err(WeatherError::MissingDescription(raw.dt_txt));
        };
        Ok(Self {
            timestamp: raw.dt_txt,
            temperature: raw.main.temp.to_string(),
            description: condition.description,
        })
    }
}

fn is_success(cod: Option<&Value>) -> bool {
    match cod {
        Some(Value::String(code)) => code == "200",
        Some(Value::Number(code)) => code.as_u64() == Some(200),
        _ => false,
    }
}

/// Turns a forecast payload into the summary handed to the model.
///
/// Entries are kept when their timestamp contains either date as a
/// substring, so only forecasts on the first and the last day show up.
pub fn render_forecast(
    payload: Value,
    start_date: &str,
    end_date: &str,
) -> Result<String, WeatherError> {
    if !is_success(payload.get("cod")) {
        return Ok(NOT_FOUND_MESSAGE.to_owned());
    }

    let forecast: Forecast = serde_json::from_value(payload)?;
    let mut lines = vec![];
    for raw in forecast.list {
        if raw.dt_txt.contains(start_date) || raw.dt_txt.contains(end_date) {
            lines.push(ForecastEntry::try_from(raw)?.to_line());
        }
    }

    if lines.is_empty() {
        return Ok(NO_DATA_MESSAGE.to_owned());
    }
    Ok(lines.join("\n"))
}

/// Looks up forecasts. Cheap to clone.
#[derive(Clone, Debug)]
pub struct WeatherClient {
    client: Client,
    config: Arc<WeatherConfig>,
}

impl WeatherClient {
    /// Creates a client for the given configuration.
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration in use.
    #[inline]
    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    fn forecast_url(&self, city: &str) -> String {
        format!(
            "{}/forecast?q={}&appid={}&units={}",
            self.config.base_url,
            urlencoding::encode(city),
            urlencoding::encode(&self.config.api_key),
            self.config.units,
        )
    }

    /// Fetches the forecast for `city` and summarizes the entries on
    /// `start_date` and `end_date`.
    ///
    /// Never fails: every problem is turned into text for the model.
    pub async fn get_weather(
        &self,
        city: &str,
        start_date: &str,
        end_date: &str,
    ) -> String {
        debug!(
            city,
            start_date,
            end_date,
            base_url = %self.config.base_url,
            "requesting forecast"
        );
        match self.fetch(city, start_date, end_date).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!("weather lookup for {city:?} failed: {err}");
                format!("Error fetching weather: {err}")
            }
        }
    }

    async fn fetch(
        &self,
        city: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<String, WeatherError> {
        let payload: Value = self
            .client
            .get(self.forecast_url(city))
            .send()
            .await?
            .json()
            .await?;
        trace!("forecast payload: {payload}");
        render_forecast(payload, start_date, end_date)
    }
}
