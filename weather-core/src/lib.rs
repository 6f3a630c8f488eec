//! Core library for the Weather Pro client.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - The WeatherAPI.com client behind the `WeatherClient` trait
//! - Shared domain models and typed errors
//! - View state, rendering and the search session that ties them together
//!
//! It is used by `weather-cli`, but the session can drive any front-end.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod session;
pub mod view;

pub use config::{Config, TogglePolicy};
pub use error::WeatherError;
pub use model::{
    CurrentConditions, DisplayUnit, ForecastDay, ForecastEntry, ForecastOutcome, Icon, Location,
    WeatherReport,
};
pub use provider::{WeatherClient, weatherapi::WeatherApiClient};
pub use session::{Session, Ticket, execute};
pub use view::{CurrentPanel, Event, ForecastRow, Screen, Status, ViewState};
