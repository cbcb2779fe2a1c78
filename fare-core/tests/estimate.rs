//! End-to-end estimation against mocked services and on-disk artifacts.

use std::{fs, path::Path};

use fare_core::{
    CabType, Config, EstimateError, FareEstimator, FareRequest, ProviderId, RouteMap, ServiceType,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SOURCE: &str = "1600 Amphitheatre Parkway, Mountain View, CA 94043";
const DESTINATION: &str = "1 Infinite Loop, Cupertino, CA 95014";

/// One stump on distance (f3) plus a constant tree.
const MODEL: &str = r#"{
    "base_score": 0.5,
    "num_features": 17,
    "trees": [
        {"nodeid": 0, "split": "f3", "split_condition": 5.0, "yes": 1, "no": 2, "missing": 1,
         "children": [{"nodeid": 1, "leaf": 6.0}, {"nodeid": 2, "leaf": 14.0}]},
        {"nodeid": 0, "leaf": 2.25}
    ]
}"#;

const ORDINAL: &str = r#"{
    "categories": [
        [" Partly cloudy throughout the day. ", " Rain throughout the day. "],
        [" Clear ", " Mostly Cloudy ", " Rain "],
        ["Black", "Lux", "Shared", "UberX"]
    ]
}"#;

const ONE_HOT: &str = r#"{"categories": [["Lyft", "Uber"]]}"#;

fn write_artifacts(dir: &Path, config: &mut Config) {
    let model = dir.join("xgb_model.json");
    let ordinal = dir.join("ordinal_encoder.json");
    let one_hot = dir.join("one_hot_encoder.json");
    fs::write(&model, MODEL).unwrap();
    fs::write(&ordinal, ORDINAL).unwrap();
    fs::write(&one_hot, ONE_HOT).unwrap();

    config.artifacts.model = model;
    config.artifacts.ordinal_encoder = ordinal;
    config.artifacts.one_hot_encoder = one_hot;
}

fn config_for(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config::default();
    for id in ProviderId::all() {
        config.upsert_provider_api_key(*id, format!("{id}-key"));
        config.endpoints.insert(id.as_str().to_string(), server.uri());
    }
    write_artifacts(dir.path(), &mut config);
    config
}

async fn mock_geocode(server: &MockServer, address: &str, lat: f64, lng: f64) {
    Mock::given(method("GET"))
        .and(path("/geocode/v1/json"))
        .and(query_param("q", address))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"geometry": {"lat": lat, "lng": lng}}]
        })))
        .mount(server)
        .await;
}

async fn mock_distance(server: &MockServer, element: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/maps/api/distancematrix/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "rows": [{"elements": [element]}]
        })))
        .mount(server)
        .await;
}

async fn mock_weather(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "main": {"temp": 61.0, "feels_like": 60.0, "humidity": 70},
            "weather": [{"description": "moderate rain"}],
            "wind": {"speed": 4.0},
            "visibility": 9000
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mock_directions(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/maps/api/directions/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "routes": [{"overview_polyline": {"points": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"}}]
        })))
        .mount(server)
        .await;
}

fn uber_x() -> CabType {
    CabType::new(ServiceType::Uber, "UberX").unwrap()
}

#[tokio::test]
async fn test_estimate_end_to_end() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_geocode(&server, SOURCE, 37.4224, -122.0842).await;
    mock_geocode(&server, DESTINATION, 37.3318, -122.0302).await;
    mock_distance(&server, serde_json::json!({"status": "OK", "distance": {"text": "9.7 mi"}})).await;
    mock_weather(&server, 1).await;
    mock_directions(&server).await;

    let estimator = FareEstimator::from_config(&config_for(&server, &dir)).expect("estimator should build");
    let quote = estimator
        .estimate(&FareRequest::new(SOURCE, DESTINATION, uber_x()))
        .await
        .expect("estimate should succeed");

    assert_eq!(quote.distance_text, "9.7 mi");
    assert_eq!(quote.distance_miles, 9.7);
    assert_eq!(quote.fare, 0.5 + 14.0 + 2.25);
    assert_eq!(quote.message(), "Predicted Fare: $16.75 for a distance of 9.7 mi");
    assert_eq!(quote.weather.short_summary.to_string(), "Rain");

    let route = quote.route.as_ref().expect("route should be decoded");
    assert_eq!(route.points.len(), 3);

    let map_path = dir.path().join("route.html");
    RouteMap::new(quote.source, quote.destination, route).write_to(&map_path).unwrap();
    assert!(fs::read_to_string(map_path).unwrap().contains("Destination"));
}

#[tokio::test]
async fn test_geocode_failure_stops_the_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_geocode(&server, SOURCE, 37.4224, -122.0842).await;
    Mock::given(method("GET"))
        .and(path("/geocode/v1/json"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/maps/api/distancematrix/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mock_weather(&server, 0).await;

    let estimator = FareEstimator::from_config(&config_for(&server, &dir)).unwrap();
    let err = estimator
        .estimate(&FareRequest::new(SOURCE, "Atlantis", uber_x()))
        .await
        .unwrap_err();

    assert!(matches!(err, EstimateError::Geocode));
    assert_eq!(err.to_string(), "Failed to geocode one or both addresses.");
}

#[tokio::test]
async fn test_distance_not_found_is_shown_verbatim() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mock_geocode(&server, SOURCE, 37.4224, -122.0842).await;
    mock_geocode(&server, DESTINATION, 37.3318, -122.0302).await;
    mock_distance(&server, serde_json::json!({"status": "NOT_FOUND"})).await;
    mock_weather(&server, 0).await;

    let estimator = FareEstimator::from_config(&config_for(&server, &dir)).unwrap();
    let err = estimator
        .estimate(&FareRequest::new(SOURCE, DESTINATION, uber_x()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Error: NOT_FOUND");
}

#[tokio::test]
async fn test_from_config_reports_missing_artifact() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(&server, &dir);
    config.artifacts.model = dir.path().join("missing.json");

    let err = FareEstimator::from_config(&config).unwrap_err();
    assert!(err.to_string().contains("Failed to read model artifact"));
}
