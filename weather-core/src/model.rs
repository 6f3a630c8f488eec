use chrono::{DateTime, Utc};
use image::{RgbaImage, imageops::FilterType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
}

/// Snapshot of the `current.json` answer. Both unit systems are always kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location: Location,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: String,
    /// Icon reference as returned by the API, usually protocol-relative.
    pub icon: String,
    pub humidity: u8,
    pub wind_kph: f64,
    pub wind_mph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub avg_temp_c: f64,
    pub avg_temp_f: f64,
    pub condition: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl DisplayUnit {
    pub fn toggled(self) -> Self {
        match self {
            DisplayUnit::Celsius => DisplayUnit::Fahrenheit,
            DisplayUnit::Fahrenheit => DisplayUnit::Celsius,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayUnit::Celsius => "celsius",
            DisplayUnit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn temperature(self, celsius: f64, fahrenheit: f64) -> String {
        match self {
            DisplayUnit::Celsius => format!("{}°C", reading(celsius)),
            DisplayUnit::Fahrenheit => format!("{}°F", reading(fahrenheit)),
        }
    }

    pub fn wind(self, kph: f64, mph: f64) -> String {
        match self {
            DisplayUnit::Celsius => format!("{} km/h", reading(kph)),
            DisplayUnit::Fahrenheit => format!("{} mph", reading(mph)),
        }
    }
}

/// Upstream value as sent, keeping at least one decimal (`21.0`, `54.23`).
fn reading(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

impl std::fmt::Display for DisplayUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded condition icon.
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    image: RgbaImage,
}

impl Icon {
    /// Decodes raw image bytes; `None` when they are not a readable image.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let image = image::load_from_memory(bytes).ok()?.to_rgba8();
        Some(Self { image })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Scaled copy for display, e.g. 60x60 for the current panel.
    pub fn thumbnail(&self, width: u32, height: u32) -> RgbaImage {
        image::imageops::resize(&self.image, width.max(1), height.max(1), FilterType::Triangle)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    pub day: ForecastDay,
    pub icon: Option<Icon>,
}

/// What became of the forecast part of a search.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    /// Forecast display is off, nothing was requested.
    Hidden,
    Loaded(Vec<ForecastEntry>),
    /// Current conditions succeeded but the forecast request did not.
    Failed(String),
}

/// Everything one completed search produced.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    pub current: CurrentConditions,
    pub current_icon: Option<Icon>,
    pub forecast: ForecastOutcome,
    pub fetched_at: DateTime<Utc>,
}
