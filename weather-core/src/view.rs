//! View state and rendering.
//!
//! `ViewState` is the whole of the window's state: last city, unit, and
//! whether the forecast is shown. Handlers are pure: [`ViewState::reduce`]
//! maps an event to a new state plus an [`Effect`] describing the I/O to run,
//! and [`render`] maps a report to the text the window displays.

use crate::{
    config::TogglePolicy,
    error::WeatherError,
    model::{DisplayUnit, ForecastOutcome, Icon, WeatherReport},
};

pub const TITLE: &str = "Weather Pro";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub last_city: Option<String>,
    pub unit: DisplayUnit,
    pub forecast_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Raw contents of the search box.
    Search(String),
    ToggleUnit,
    ToggleForecast,
}

/// What has to happen after a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Input was rejected before any I/O.
    Reject(WeatherError),
    Fetch(FetchPlan),
    /// Redraw the cached report for `city` with the new unit.
    Rerender { city: String },
    ClearForecast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan {
    pub city: String,
    pub include_forecast: bool,
}

impl ViewState {
    pub fn new(unit: DisplayUnit) -> Self {
        Self {
            last_city: None,
            unit,
            forecast_visible: false,
        }
    }

    pub fn reduce(&self, event: Event, policy: TogglePolicy) -> (ViewState, Effect) {
        let mut next = self.clone();

        let effect = match event {
            Event::Search(input) => {
                let city = input.trim();
                if city.is_empty() {
                    return (next, Effect::Reject(WeatherError::empty_city()));
                }
                next.last_city = Some(city.to_string());
                next.fetch_last_city()
            }
            Event::ToggleUnit => {
                next.unit = next.unit.toggled();
                match (&next.last_city, policy) {
                    (None, _) => Effect::None,
                    (Some(_), TogglePolicy::Refetch) => next.fetch_last_city(),
                    (Some(city), TogglePolicy::Reformat) => Effect::Rerender { city: city.clone() },
                }
            }
            Event::ToggleForecast => {
                next.forecast_visible = !next.forecast_visible;
                if !next.forecast_visible {
                    Effect::ClearForecast
                } else {
                    next.fetch_last_city()
                }
            }
        };

        (next, effect)
    }

    fn fetch_last_city(&self) -> Effect {
        match &self.last_city {
            Some(city) => Effect::Fetch(FetchPlan {
                city: city.clone(),
                include_forecast: self.forecast_visible,
            }),
            None => Effect::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading(String),
    Error(String),
}

impl Status {
    pub fn text(&self) -> String {
        match self {
            Status::Idle => String::new(),
            Status::Loading(city) => format!("Loading weather data for {city}..."),
            Status::Error(msg) => msg.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentPanel {
    pub location: String,
    pub temperature: String,
    pub condition: String,
    pub humidity: String,
    pub wind: String,
    pub icon: Option<Icon>,
}

impl CurrentPanel {
    /// Label/value pairs in display order.
    pub fn rows(&self) -> [(&'static str, &str); 5] {
        [
            ("Location", self.location.as_str()),
            ("Temperature", self.temperature.as_str()),
            ("Condition", self.condition.as_str()),
            ("Humidity", self.humidity.as_str()),
            ("Wind", self.wind.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub text: String,
    pub icon: Option<Icon>,
}

/// Description of everything the window shows below the search box.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Screen {
    pub status: Status,
    pub current: Option<CurrentPanel>,
    /// `None` while the forecast region is empty or hidden.
    pub forecast: Option<Vec<ForecastRow>>,
}

impl Screen {
    pub fn clear(&mut self) {
        self.current = None;
        self.forecast = None;
    }
}

/// Maps a report to panel text for the given unit.
pub fn render(report: &WeatherReport, unit: DisplayUnit) -> (CurrentPanel, Option<Vec<ForecastRow>>) {
    let current = &report.current;
    let panel = CurrentPanel {
        location: format!("{}, {}", current.location.name, current.location.country),
        temperature: unit.temperature(current.temp_c, current.temp_f),
        condition: current.condition.clone(),
        humidity: format!("{}%", current.humidity),
        wind: unit.wind(current.wind_kph, current.wind_mph),
        icon: report.current_icon.clone(),
    };

    let forecast = match &report.forecast {
        ForecastOutcome::Loaded(entries) => Some(
            entries
                .iter()
                .map(|entry| ForecastRow {
                    text: format!(
                        "{}: {}, {}",
                        entry.day.date,
                        entry.day.condition,
                        unit.temperature(entry.day.avg_temp_c, entry.day.avg_temp_f)
                    ),
                    icon: entry.icon.clone(),
                })
                .collect(),
        ),
        ForecastOutcome::Hidden | ForecastOutcome::Failed(_) => None,
    };

    (panel, forecast)
}
