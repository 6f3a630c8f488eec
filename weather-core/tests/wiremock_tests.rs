//! Integration tests for the WeatherAPI client and search session using wiremock.
//!
//! These run the real HTTP client against a mock server to cover response
//! parsing, upstream error extraction, transport failures and the
//! best-effort icon policy.

use std::{io::Cursor, sync::Arc, time::Duration};

use weather_core::{
    Config, DisplayUnit, Session, Status, WeatherApiClient, WeatherClient, WeatherError,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const KEY: &str = "TEST_KEY";

fn create_test_client(mock_server: &MockServer, timeout: Duration) -> WeatherApiClient {
    WeatherApiClient::new(
        KEY.to_string(),
        format!("{}/v1", mock_server.uri()),
        timeout,
        "http".to_string(),
    )
    .expect("Failed to create client")
}

/// Icon reference the way the API hands it out: protocol-relative.
fn icon_ref(mock_server: &MockServer, file: &str) -> String {
    format!("{}/icons/{file}", mock_server.uri().trim_start_matches("http:"))
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 200, 0, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode png");
    bytes
}

fn current_response(mock_server: &MockServer) -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": "London",
            "region": "City of London, Greater London",
            "country": "United Kingdom",
            "lat": 51.52,
            "lon": -0.11,
            "localtime_epoch": 1_700_000_000,
            "localtime": "2023-11-14 22:13"
        },
        "current": {
            "last_updated_epoch": 1_699_999_200,
            "temp_c": 11.0,
            "temp_f": 51.8,
            "is_day": 0,
            "condition": {
                "text": "Light rain",
                "icon": icon_ref(mock_server, "296.png"),
                "code": 1183
            },
            "wind_mph": 9.4,
            "wind_kph": 15.1,
            "wind_dir": "SW",
            "humidity": 87,
            "cloud": 75,
            "feelslike_c": 8.9,
            "feelslike_f": 48.1
        }
    })
}

fn forecast_response(mock_server: &MockServer) -> serde_json::Value {
    let day = |date: &str, c: f64, f: f64, text: &str| {
        serde_json::json!({
            "date": date,
            "date_epoch": 0,
            "day": {
                "maxtemp_c": c + 3.0,
                "mintemp_c": c - 3.0,
                "avgtemp_c": c,
                "avgtemp_f": f,
                "condition": {"text": text, "icon": icon_ref(mock_server, "113.png"), "code": 1000}
            },
            "hour": []
        })
    };

    let mut body = current_response(mock_server);
    body["forecast"] = serde_json::json!({
        "forecastday": [
            day("2023-11-14", 10.2, 50.4, "Patchy rain possible"),
            day("2023-11-15", 8.1, 46.6, "Sunny"),
            day("2023-11-16", 9.7, 49.5, "Overcast"),
        ]
    });
    body
}

fn city_not_found() -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(serde_json::json!({
        "error": {"code": 1006, "message": "City not found"}
    }))
}

async fn mount_icon(mock_server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/icons/296.png"))
        .respond_with(response.clone())
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/icons/113.png"))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

// ============================================================================
// Client
// ============================================================================

#[tokio::test]
async fn test_fetch_current_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("key", KEY))
        .and(query_param("q", "London"))
        .and(query_param("aqi", "no"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_response(&mock_server)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, Duration::from_secs(5));
    let current = client.fetch_current("London").await.expect("current conditions");

    assert_eq!(current.location.name, "London");
    assert_eq!(current.location.country, "United Kingdom");
    assert_eq!(current.temp_c, 11.0);
    assert_eq!(current.temp_f, 51.8);
    assert_eq!(current.condition, "Light rain");
    assert_eq!(current.humidity, 87);
    assert_eq!(current.wind_kph, 15.1);
    assert_eq!(current.wind_mph, 9.4);
    assert!(current.icon.starts_with("//127.0.0.1"));
}

#[tokio::test]
async fn test_fetch_current_upstream_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(city_not_found())
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, Duration::from_secs(5));
    let err = client.fetch_current("Atlantis").await.unwrap_err();

    assert_eq!(err, WeatherError::Upstream("City not found".to_string()));
    assert_eq!(err.to_string(), "City not found");
}

#[tokio::test]
async fn test_fetch_current_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, Duration::from_secs(5));
    let err = client.fetch_current("London").await.unwrap_err();

    assert!(matches!(err, WeatherError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_fetch_current_unexpected_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"location": {"name": "London"}})),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, Duration::from_secs(5));
    let err = client.fetch_current("London").await.unwrap_err();

    assert!(matches!(err, WeatherError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_fetch_current_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_response(&mock_server))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, Duration::from_millis(200));
    let err = client.fetch_current("London").await.unwrap_err();

    assert!(matches!(err, WeatherError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = WeatherApiClient::new(
        KEY.to_string(),
        "http://127.0.0.1:1/v1".to_string(),
        Duration::from_secs(2),
        "http".to_string(),
    )
    .expect("Failed to create client");

    let err = client.fetch_current("London").await.unwrap_err();
    assert!(matches!(err, WeatherError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn test_transport_errors_do_not_leak_api_key() {
    let config = Config {
        base_url: "http://127.0.0.1:1/v1".to_string(),
        timeout_secs: 2,
        ..Config::default()
    };
    let client = weather_core::provider::client_with_key(&config, "SECRET_KEY_123".into())
        .expect("Failed to create client");

    let err = client.fetch_current("London").await.unwrap_err();
    assert!(matches!(err, WeatherError::Transport(_)), "got {err:?}");
    assert!(!err.to_string().contains("SECRET_KEY_123"), "key leaked: {err}");

    let mut session = Session::new(Arc::new(client), &config);
    session.on_search("London").await;
    let status = session.screen().status.text();
    assert!(status.starts_with("Network error"), "got {status}");
    assert!(!status.contains("SECRET_KEY_123"), "key leaked: {status}");
}

#[tokio::test]
async fn test_fetch_forecast_preserves_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .and(query_param("key", KEY))
        .and(query_param("q", "London"))
        .and(query_param("days", "3"))
        .and(query_param("aqi", "no"))
        .and(query_param("alerts", "no"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response(&mock_server)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, Duration::from_secs(5));
    let days = client.fetch_forecast("London", 3).await.expect("forecast");

    let dates: Vec<_> = days.iter().map(|d| d.date.as_str()).collect();
    assert_eq!(dates, ["2023-11-14", "2023-11-15", "2023-11-16"]);
    assert_eq!(days[1].condition, "Sunny");
    assert_eq!(days[1].avg_temp_c, 8.1);
    assert_eq!(days[1].avg_temp_f, 46.6);
}

#[tokio::test]
async fn test_fetch_forecast_empty_is_valid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"forecast": {"forecastday": []}})),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, Duration::from_secs(5));
    let days = client.fetch_forecast("London", 3).await.expect("forecast");
    assert!(days.is_empty());
}

#[tokio::test]
async fn test_fetch_icon_success() {
    let mock_server = MockServer::start().await;
    mount_icon(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_bytes(png_bytes())
            .insert_header("content-type", "image/png"),
    )
    .await;

    let client = create_test_client(&mock_server, Duration::from_secs(5));
    let icon = client
        .fetch_icon(&icon_ref(&mock_server, "113.png"))
        .await
        .expect("icon decoded");

    assert_eq!(icon.dimensions(), (8, 8));
}

#[tokio::test]
async fn test_fetch_icon_failures_are_absent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/icons/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/icons/garbage.png"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not an image"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, Duration::from_secs(5));

    assert!(client.fetch_icon(&icon_ref(&mock_server, "missing.png")).await.is_none());
    assert!(client.fetch_icon(&icon_ref(&mock_server, "garbage.png")).await.is_none());
    assert!(client.fetch_icon("").await.is_none());
}

// ============================================================================
// Session against the real client
// ============================================================================

fn create_session(mock_server: &MockServer) -> Session<WeatherApiClient> {
    let client = create_test_client(mock_server, Duration::from_secs(5));
    Session::new(Arc::new(client), &Config::default())
}

#[tokio::test]
async fn test_session_renders_text_when_icon_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_response(&mock_server)))
        .mount(&mock_server)
        .await;
    mount_icon(&mock_server, ResponseTemplate::new(500)).await;

    let mut session = create_session(&mock_server);
    session.on_search("London").await;

    let panel = session.screen().current.as_ref().expect("panel shown");
    assert_eq!(panel.location, "London, United Kingdom");
    assert_eq!(panel.temperature, "11.0°C");
    assert_eq!(panel.condition, "Light rain");
    assert_eq!(panel.humidity, "87%");
    assert_eq!(panel.wind, "15.1 km/h");
    assert!(panel.icon.is_none());
    assert_eq!(session.screen().status, Status::Idle);
}

#[tokio::test]
async fn test_session_shows_icon_and_forecast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_response(&mock_server)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response(&mock_server)))
        .mount(&mock_server)
        .await;
    mount_icon(&mock_server, ResponseTemplate::new(200).set_body_bytes(png_bytes())).await;

    let mut session = create_session(&mock_server).with_forecast_visible(true);
    session.on_search("London").await;
    session.on_unit_toggle().await;

    assert_eq!(session.state().unit, DisplayUnit::Fahrenheit);
    let screen = session.screen();
    let panel = screen.current.as_ref().expect("panel shown");
    assert_eq!(panel.temperature, "51.8°F");
    assert_eq!(panel.wind, "9.4 mph");
    assert!(panel.icon.is_some());

    let rows = screen.forecast.as_ref().expect("forecast shown");
    let texts: Vec<_> = rows.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(
        texts,
        [
            "2023-11-14: Patchy rain possible, 50.4°F",
            "2023-11-15: Sunny, 46.6°F",
            "2023-11-16: Overcast, 49.5°F",
        ]
    );
    assert!(rows.iter().all(|r| r.icon.is_some()));
}

#[tokio::test]
async fn test_session_upstream_error_clears_display() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_response(&mock_server)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("q", "Atlantis"))
        .respond_with(city_not_found())
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_response(&mock_server)))
        .mount(&mock_server)
        .await;
    mount_icon(&mock_server, ResponseTemplate::new(404)).await;

    let mut session = create_session(&mock_server).with_forecast_visible(true);
    session.on_search("London").await;
    assert!(session.screen().current.is_some());
    assert!(session.screen().forecast.is_some());

    session.on_search("Atlantis").await;

    assert!(session.screen().current.is_none());
    assert!(session.screen().forecast.is_none());
    assert_eq!(session.screen().status, Status::Error("City not found".into()));
    assert_eq!(session.state().last_city.as_deref(), Some("Atlantis"));
}

#[tokio::test]
async fn test_session_blank_input_issues_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_response(&mock_server)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut session = create_session(&mock_server);
    session.on_search("   ").await;

    assert!(session.state().last_city.is_none());
    assert!(matches!(session.screen().status, Status::Error(_)));
    assert!(session.screen().current.is_none());
}
