use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::WeatherError,
    model::{CurrentConditions, ForecastDay, Icon},
    provider::weatherapi::WeatherApiClient,
};

pub mod weatherapi;

/// Access to an upstream weather source.
///
/// `fetch_current` and `fetch_forecast` are the mandatory path of a search and
/// report every failure. `fetch_icon` is decoration: it swallows failures and
/// answers `None`.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str) -> Result<CurrentConditions, WeatherError>;

    async fn fetch_forecast(&self, city: &str, days: u8) -> Result<Vec<ForecastDay>, WeatherError>;

    async fn fetch_icon(&self, icon_ref: &str) -> Option<Icon>;
}

/// Construct the WeatherAPI.com client from config.
///
/// Fails when no API key can be resolved; callers treat that as fatal.
pub fn client_from_config(config: &Config) -> anyhow::Result<WeatherApiClient> {
    let api_key = config.resolve_api_key()?;
    client_with_key(config, api_key)
}

pub fn client_with_key(config: &Config, api_key: String) -> anyhow::Result<WeatherApiClient> {
    Ok(WeatherApiClient::new(
        api_key,
        config.base_url.clone(),
        config.timeout(),
        config.icon_scheme.clone(),
    )?)
}

/// Turns an icon reference from the API into a fetchable URL.
///
/// The API hands out protocol-relative paths (`//cdn.weatherapi.com/...`).
pub fn icon_url(scheme: &str, icon_ref: &str) -> Option<String> {
    let icon_ref = icon_ref.trim();
    if icon_ref.is_empty() {
        None
    } else if icon_ref.starts_with("//") {
        Some(format!("{scheme}:{icon_ref}"))
    } else {
        Some(icon_ref.to_string())
    }
}
