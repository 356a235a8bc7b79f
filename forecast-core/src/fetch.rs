use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;
use url::Url;

use crate::error::FetchError;
use crate::model::{ForecastSnapshot, WeatherRecord};

/// WeatherAPI.com forecast endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1/forecast.json";

/// How many forecast days to request when nothing is configured.
pub const DEFAULT_FORECAST_DAYS: u8 = 3;

/// Client for the forecast API: builds the request URL, issues exactly one
/// GET per fetch, and normalizes the JSON body into a [`ForecastSnapshot`].
///
/// No retries, no backoff; any failure is terminal for that attempt.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    days: u8,
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: String, days: u8) -> Self {
        Self::with_base_url(api_key, days, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different endpoint, e.g. a test server.
    pub fn with_base_url(api_key: String, days: u8, base_url: String) -> Self {
        Self {
            api_key,
            days,
            base_url,
            http: Client::new(),
        }
    }

    /// Build the request URL. Parameter order matches the query-string shape
    /// the API expects: key, location, day count, then the fixed tail.
    pub fn forecast_url(&self, query: &str) -> Result<Url, FetchError> {
        let days = self.days.to_string();
        let url = Url::parse_with_params(
            &self.base_url,
            &[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ],
        )?;
        Ok(url)
    }

    /// Fetch and normalize the forecast for a location query.
    pub async fn fetch(&self, query: &str) -> Result<ForecastSnapshot, FetchError> {
        let url = self.forecast_url(query)?;
        debug!("requesting forecast for {query:?}");

        let res = self.http.get(url).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            warn!("forecast request for {query:?} failed with status {status}");
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        normalize(&body)
    }
}

/// Parse the response body into day records plus the current-conditions
/// record. All-or-nothing: either the whole snapshot decodes or a typed
/// error comes back and nothing is produced.
fn normalize(body: &str) -> Result<ForecastSnapshot, FetchError> {
    let doc: ApiResponse = serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    let city = doc.location.name;

    let days: Vec<WeatherRecord> = doc
        .forecast
        .forecastday
        .into_iter()
        .map(|entry| WeatherRecord {
            city: city.clone(),
            timestamp: entry.date,
            condition: entry.day.condition.text,
            // Empty marks a daily record.
            current_temp: String::new(),
            max_temp: entry.day.maxtemp_c,
            min_temp: entry.day.mintemp_c,
            icon_url: entry.day.condition.icon,
            hours_payload: entry.hour.get().to_string(),
        })
        .collect();

    // The current block carries no max/min and no hours; those always come
    // from today's daily aggregate.
    let today = days.first().ok_or(FetchError::EmptyForecast)?;

    let current = WeatherRecord {
        city: city.clone(),
        timestamp: doc.current.last_updated,
        condition: doc.current.condition.text,
        current_temp: doc.current.temp_c,
        max_temp: today.max_temp.clone(),
        min_temp: today.min_temp.clone(),
        icon_url: doc.current.condition.icon,
        hours_payload: today.hours_payload.clone(),
    };

    Ok(ForecastSnapshot { current, days })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    // Never cut a multibyte character in half.
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

// Wire shapes of the API response. Only the fields the records need are
// declared; anything missing or mis-shaped fails the whole decode.

#[derive(Debug, Deserialize)]
struct ApiResponse {
    location: ApiLocation,
    current: ApiCurrent,
    forecast: ApiForecast,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    last_updated: String,
    #[serde(deserialize_with = "number_as_text")]
    temp_c: String,
    condition: ApiCondition,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastDay {
    date: String,
    day: ApiDay,
    /// Captured verbatim; the hourly view decodes it downstream.
    hour: Box<RawValue>,
}

#[derive(Debug, Deserialize)]
struct ApiDay {
    #[serde(deserialize_with = "number_as_text")]
    maxtemp_c: String,
    #[serde(deserialize_with = "number_as_text")]
    mintemp_c: String,
    condition: ApiCondition,
}

/// The API serves temperatures as JSON numbers; accept those or strings and
/// keep them as decimal text.
fn number_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    Ok(match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => n.to_string(),
        NumberOrText::Text(s) => s,
    })
}
