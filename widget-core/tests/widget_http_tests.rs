//! Widget behaviour against a mock OpenWeather endpoint.

use std::{sync::Arc, time::Duration};

use weather_widget_core::{
    Config, Coordinates, Endpoint, FixedGeolocator, Geolocator, NoGeolocation, OpenWeatherClient,
    Outcome, RecordingAlerts, WeatherWidget,
    alert::FETCH_ALERT,
    display::{DEFAULT_CITY_TEXT, DEFAULT_ICON_URL, LOCATION_ERROR_TEXT, PLACEHOLDER, icon_url},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param, query_param_is_missing},
};

const WEATHER_PATH: &str = "/data/2.5/weather";

fn weather_body(name: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 139.69, "lat": 35.69 },
        "weather": [{ "id": 500, "main": "Rain", "description": "小雨", "icon": "10d" }],
        "main": { "temp": temp, "feels_like": temp - 1.0, "humidity": 73, "pressure": 1012 },
        "dt": 1_700_000_000,
        "name": name
    })
}

fn direct_endpoint(server: &MockServer) -> Endpoint {
    Endpoint::Direct {
        base_url: format!("{}{WEATHER_PATH}", server.uri()),
        api_key: "TEST_KEY".into(),
    }
}

fn widget(
    endpoint: Endpoint,
    geolocator: Box<dyn Geolocator>,
) -> (WeatherWidget, Arc<RecordingAlerts>) {
    let alerts = Arc::new(RecordingAlerts::default());
    let client = OpenWeatherClient::new(endpoint, Some(Duration::from_secs(5)))
        .expect("client should build");
    let widget = WeatherWidget::new(Box::new(client), geolocator, alerts.clone());
    (widget, alerts)
}

#[tokio::test]
async fn city_search_sends_one_request_with_expected_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Sapporo"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "ja"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("札幌市", 21.4)))
        .expect(1)
        .mount(&server)
        .await;

    let (widget, alerts) = widget(direct_endpoint(&server), Box::new(NoGeolocation));

    assert_eq!(widget.submit("  Sapporo  ").await, Outcome::Rendered);

    let slots = widget.slots();
    assert_eq!(slots.location, "札幌市");
    assert_eq!(slots.temperature, "21");
    assert_eq!(slots.description, "小雨");
    assert_eq!(slots.humidity, "73");
    assert_eq!(slots.icon.src, icon_url("10d"));
    assert_eq!(slots.icon.alt, "小雨");
    assert!(alerts.messages().is_empty());
}

#[tokio::test]
async fn http_error_resets_slots_and_alerts_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (widget, alerts) = widget(direct_endpoint(&server), Box::new(NoGeolocation));

    assert_eq!(widget.submit("Atlantis").await, Outcome::FetchFailed);

    let slots = widget.slots();
    assert_eq!(slots.location, LOCATION_ERROR_TEXT);
    assert_eq!(slots.temperature, PLACEHOLDER);
    assert_eq!(slots.description, PLACEHOLDER);
    assert_eq!(slots.humidity, PLACEHOLDER);
    assert_eq!(slots.icon.src, DEFAULT_ICON_URL);
    assert_eq!(alerts.messages(), vec![FETCH_ALERT]);
}

#[tokio::test]
async fn document_without_conditions_fails_to_render() {
    let server = MockServer::start().await;
    let mut body = weather_body("Tokyo", 18.0);
    body.as_object_mut().expect("object").remove("weather");
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let (widget, _alerts) = widget(direct_endpoint(&server), Box::new(NoGeolocation));

    assert_eq!(widget.submit("Tokyo").await, Outcome::RenderFailed);
    assert_eq!(widget.slots().location, LOCATION_ERROR_TEXT);
    assert_eq!(widget.slots().temperature, PLACEHOLDER);
}

#[tokio::test]
async fn init_uses_device_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("lat", "35.5"))
        .and(query_param("lon", "139.25"))
        .and(query_param_is_missing("q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("川崎市", 15.5)))
        .expect(1)
        .mount(&server)
        .await;

    let position = Coordinates::new(35.5, 139.25).expect("valid coordinates");
    let (widget, alerts) =
        widget(direct_endpoint(&server), Box::new(FixedGeolocator::new(position)));

    assert_eq!(widget.init().await, Outcome::Rendered);
    assert_eq!(widget.slots().location, "川崎市");
    assert_eq!(widget.slots().temperature, "16");
    assert!(alerts.messages().is_empty());
}

#[tokio::test]
async fn geolocation_failure_falls_back_to_default_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "Tokyo"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(weather_body("東京都", 12.0))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (widget, alerts) = widget(direct_endpoint(&server), Box::new(NoGeolocation));
    let widget = Arc::new(widget);

    let task = tokio::spawn({
        let widget = widget.clone();
        async move { widget.init().await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(widget.slots().location, DEFAULT_CITY_TEXT);
    assert_eq!(widget.slots().icon.src, DEFAULT_ICON_URL);

    assert_eq!(task.await.expect("init task"), Outcome::Rendered);
    assert_eq!(widget.slots().location, "東京都");
    assert!(alerts.messages().is_empty());
}

#[tokio::test]
async fn out_of_range_configured_location_falls_back_without_alert() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param_is_missing("q"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "Tokyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("東京都", 12.0)))
        .expect(1)
        .mount(&server)
        .await;

    let config: Config = toml::from_str("[location]\nlatitude = 200.0\nlongitude = 0.0\n")
        .expect("config should parse");
    let position = config.location.expect("location table");
    let (widget, alerts) =
        widget(direct_endpoint(&server), Box::new(FixedGeolocator::new(position)));

    assert_eq!(widget.init().await, Outcome::Rendered);
    assert_eq!(widget.slots().location, "東京都");
    assert!(alerts.messages().is_empty());
}

#[tokio::test]
async fn proxy_mode_sends_no_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Fukuoka"))
        .and(query_param_is_missing("appid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("福岡市", 20.0)))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = Endpoint::Proxy { url: format!("{}/weather", server.uri()) };
    let (widget, _alerts) = widget(endpoint, Box::new(NoGeolocation));

    assert_eq!(widget.submit("Fukuoka").await, Outcome::Rendered);
}

#[tokio::test]
async fn slower_older_request_does_not_overwrite_newer_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "Slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(weather_body("Slow", 1.0))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "Fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Fast", 2.0)))
        .mount(&server)
        .await;

    let (widget, _alerts) = widget(direct_endpoint(&server), Box::new(NoGeolocation));

    let (slow, fast) = tokio::join!(widget.submit("Slow"), widget.submit("Fast"));

    assert_eq!(slow, Outcome::Superseded);
    assert_eq!(fast, Outcome::Rendered);
    assert_eq!(widget.slots().location, "Fast");
}

#[tokio::test]
async fn superseded_failure_raises_no_alert() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "Broken"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "Nagoya"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("名古屋市", 25.0)))
        .mount(&server)
        .await;

    let (widget, alerts) = widget(direct_endpoint(&server), Box::new(NoGeolocation));

    let (broken, good) = tokio::join!(widget.submit("Broken"), widget.submit("Nagoya"));

    assert_eq!(broken, Outcome::Superseded);
    assert_eq!(good, Outcome::Rendered);
    assert_eq!(widget.slots().location, "名古屋市");
    assert!(alerts.messages().is_empty());
}
