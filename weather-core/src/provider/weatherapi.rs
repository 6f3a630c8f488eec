use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    error::WeatherError,
    model::{CurrentConditions, ForecastDay, Icon, Location},
};

use super::{WeatherClient, icon_url};

/// Client for the WeatherAPI.com `current.json` and `forecast.json` endpoints.
#[derive(Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    icon_scheme: String,
    http: Client,
}

impl std::fmt::Debug for WeatherApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiClient")
            .field("base_url", &self.base_url)
            .field("icon_scheme", &self.icon_scheme)
            .finish_non_exhaustive()
    }
}

impl WeatherApiClient {
    pub fn new(
        api_key: String,
        base_url: String,
        timeout: Duration,
        icon_scheme: String,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            icon_scheme,
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(url = %url, ?params, "Requesting WeatherAPI");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        parse_body(status, &body)
    }
}

/// The API reports errors in-band, usually with a 4xx status.
fn parse_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, WeatherError> {
    if let Ok(WaErrorEnvelope { error: Some(err) }) = serde_json::from_str(body) {
        return Err(WeatherError::Upstream(err.message));
    }

    if !status.is_success() {
        return Err(WeatherError::Upstream(format!(
            "request failed with status {}: {}",
            status,
            truncate_body(body),
        )));
    }

    Ok(serde_json::from_str(body)?)
}

#[derive(Debug, Deserialize)]
struct WaErrorEnvelope {
    #[serde(default)]
    error: Option<WaError>,
}

#[derive(Debug, Deserialize)]
struct WaError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    temp_f: f64,
    condition: WaCondition,
    humidity: u8,
    wind_kph: f64,
    wind_mph: f64,
}

#[derive(Debug, Deserialize)]
struct WaCurrentResponse {
    location: WaLocation,
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_c: f64,
    avgtemp_f: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaDay,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    forecast: WaForecast,
}

impl From<WaCurrentResponse> for CurrentConditions {
    fn from(parsed: WaCurrentResponse) -> Self {
        CurrentConditions {
            location: Location {
                name: parsed.location.name,
                country: parsed.location.country,
            },
            temp_c: parsed.current.temp_c,
            temp_f: parsed.current.temp_f,
            condition: parsed.current.condition.text,
            icon: parsed.current.condition.icon,
            humidity: parsed.current.humidity,
            wind_kph: parsed.current.wind_kph,
            wind_mph: parsed.current.wind_mph,
        }
    }
}

impl From<WaForecastDay> for ForecastDay {
    fn from(entry: WaForecastDay) -> Self {
        ForecastDay {
            date: entry.date,
            avg_temp_c: entry.day.avgtemp_c,
            avg_temp_f: entry.day.avgtemp_f,
            condition: entry.day.condition.text,
            icon: entry.day.condition.icon,
        }
    }
}

#[async_trait]
impl WeatherClient for WeatherApiClient {
    #[instrument(skip(self))]
    async fn fetch_current(&self, city: &str) -> Result<CurrentConditions, WeatherError> {
        let parsed: WaCurrentResponse = self
            .get_json("current.json", &[("q", city), ("aqi", "no")])
            .await?;

        Ok(parsed.into())
    }

    #[instrument(skip(self))]
    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<Vec<ForecastDay>, WeatherError> {
        let days = days.to_string();
        let parsed: WaForecastResponse = self
            .get_json(
                "forecast.json",
                &[("q", city), ("days", &days), ("aqi", "no"), ("alerts", "no")],
            )
            .await?;

        Ok(parsed.forecast.forecastday.into_iter().map(ForecastDay::from).collect())
    }

    #[instrument(skip(self))]
    async fn fetch_icon(&self, icon_ref: &str) -> Option<Icon> {
        let url = icon_url(&self.icon_scheme, icon_ref)?;

        let bytes = match self.http.get(&url).send().await.and_then(|r| r.error_for_status()) {
            Ok(res) => match res.bytes().await {
                Ok(bytes) => bytes,
                Err(err) => {
                    debug!(url = %url, error = %err, "Dropping icon, body unreadable");
                    return None;
                }
            },
            Err(err) => {
                debug!(url = %url, error = %err, "Dropping icon, request failed");
                return None;
            }
        };

        let icon = Icon::decode(&bytes);
        if icon.is_none() {
            debug!(url = %url, len = bytes.len(), "Dropping icon, not a decodable image");
        }
        icon
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
