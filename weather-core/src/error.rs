use thiserror::Error;

/// Everything that can go wrong while looking up weather for a city.
///
/// A search treats every variant the same way: the message goes to the status
/// line and both display regions are cleared. Only the kind differs, so
/// callers can still match on it when they care.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// Rejected before any request was made (e.g. empty city).
    #[error("{0}")]
    Validation(String),

    /// The API answered with an `error` object; carries its message verbatim.
    #[error("{0}")]
    Upstream(String),

    /// Connection, DNS, timeout or other HTTP client failure.
    #[error("Network error: {0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Parse(String),
}

impl WeatherError {
    pub fn empty_city() -> Self {
        Self::Validation("Please enter a city name.".to_string())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WeatherError::Validation(_) => "validation",
            WeatherError::Upstream(_) => "upstream",
            WeatherError::Transport(_) => "transport",
            WeatherError::Parse(_) => "parse",
        }
    }
}

/// The request URL carries `key=`, so it is stripped before formatting.
impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        WeatherError::Transport(err.without_url().to_string())
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::Parse(err.to_string())
    }
}
