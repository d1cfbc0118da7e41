//! HTTP adapters against wiremock servers

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use std::time::Duration;

use tripplanner::config::{CurrencyConfig, PlacesConfig, WeatherConfig};
use tripplanner::http::{client, default_user_agent, fetch_json};
use tripplanner::currency::RateSource;
use tripplanner::places::PlacesBackend;
use tripplanner::places::nominatim::NominatimClient;
use tripplanner::{
    CurrencyService, ExchangeRateApiClient, PlacesProviderKind, PlacesService, TripPlannerError,
    WeatherCondition, WeatherService,
};

#[tokio::test]
async fn test_fetch_json_separates_status_and_decode_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let http = client(Duration::from_secs(5), &default_user_agent()).unwrap();

    let busy = fetch_json::<serde_json::Value>(http.get(format!("{}/busy", server.uri())), "Overpass")
        .await
        .unwrap_err();
    assert!(matches!(
        &busy,
        TripPlannerError::Status { service, status } if service == "Overpass" && status.as_u16() == 429
    ));
    assert!(busy.user_message().contains("rate limiting"));

    let garbled =
        fetch_json::<serde_json::Value>(http.get(format!("{}/garbled", server.uri())), "Overpass")
            .await
            .unwrap_err();
    assert!(matches!(garbled, TripPlannerError::Decode { .. }));
    assert!(garbled.to_string().starts_with("Failed to parse Overpass response"));
}

#[tokio::test]
async fn test_exchange_rate_client_reads_conversion_rates_with_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest/EUR"))
        .and(query_param("apikey", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "conversion_rates": {"USD": 1.1, "GBP": 0.85, "note": "ignored"}
        })))
        .mount(&server)
        .await;

    let config = CurrencyConfig {
        base_url: server.uri(),
        api_key: Some("secret-key".into()),
        ..CurrencyConfig::default()
    };
    let rates = ExchangeRateApiClient::new(&config)
        .unwrap()
        .latest_rates("EUR")
        .await
        .unwrap();

    assert_eq!(rates.len(), 2);
    assert_eq!(rates["GBP"], 0.85);
}

#[tokio::test]
async fn test_currency_service_cross_rate_through_usd() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest/CHF"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest/USD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rates": {"CHF": 0.8, "SEK": 9.6}
        })))
        .mount(&server)
        .await;

    let service = CurrencyService::new(&CurrencyConfig {
        base_url: server.uri(),
        ..CurrencyConfig::default()
    })
    .unwrap();
    let rate = service.get_exchange_rate("chf", "sek").await;

    assert_eq!(rate.from, "CHF");
    assert_eq!(rate.rate, 12.0);
    assert_eq!(rate.symbol, "kr");
}

#[tokio::test]
async fn test_open_meteo_short_response_is_padded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("forecast_days", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "daily": {
                "time": ["2025-06-01", "2025-06-02"],
                "temperature_2m_max": [20.0, 22.0],
                "temperature_2m_min": [10.0, 12.0],
                "weathercode": [63, 95],
                "windspeed_10m_max": [20.4, 30.0]
            }
        })))
        .mount(&server)
        .await;

    let service = WeatherService::new(&WeatherConfig {
        open_meteo_url: server.uri(),
        ..WeatherConfig::default()
    })
    .unwrap();
    let forecast = service.forecast(38.7, -9.1, 4).await;

    let temps: Vec<f32> = forecast.iter().map(|day| day.temperature).collect();
    assert_eq!(temps, vec![15.0, 17.0, 18.0, 17.0]);
    assert_eq!(forecast[0].condition, WeatherCondition::Rain);
    assert_eq!(forecast[1].condition, WeatherCondition::Storm);
    assert_eq!(forecast[3].description, "Thunderstorm");
}

#[tokio::test]
async fn test_forecast_beyond_native_horizon_repeats_pattern() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("forecast_days", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "daily": {
                "time": ["2025-06-01", "2025-06-02"],
                "temperature_2m_max": [20.0, 30.0],
                "temperature_2m_min": [10.0, 20.0],
                "weathercode": [0, 3],
                "windspeed_10m_max": [5.0, 5.0]
            }
        })))
        .mount(&server)
        .await;

    let service = WeatherService::new(&WeatherConfig {
        open_meteo_url: server.uri(),
        max_forecast_days: 2,
        ..WeatherConfig::default()
    })
    .unwrap();
    let forecast = service.forecast(1.0, 1.0, 5).await;

    let temps: Vec<f32> = forecast.iter().map(|day| day.temperature).collect();
    assert_eq!(temps, vec![15.0, 25.0, 15.0, 25.0, 15.0]);
}

#[tokio::test]
async fn test_openweather_used_when_open_meteo_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/owm/forecast"))
        .and(query_param("appid", "owm-test-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [
                {
                    "dt": 1_746_100_800,
                    "main": {"temp": 18.4, "humidity": 60},
                    "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
                    "wind": {"speed": 5.0}
                },
                {
                    "dt": 1_746_187_200,
                    "main": {"temp": 21.0, "humidity": 50},
                    "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
                    "wind": {"speed": 2.5}
                }
            ]
        })))
        .mount(&server)
        .await;

    let service = WeatherService::new(&WeatherConfig {
        open_meteo_url: format!("{}/v1", server.uri()),
        openweather_url: format!("{}/owm", server.uri()),
        openweather_api_key: Some("owm-test-key".into()),
        ..WeatherConfig::default()
    })
    .unwrap();
    let forecast = service.forecast(51.5, -0.12, 3).await;

    assert_eq!(forecast.len(), 3);
    assert_eq!(forecast[0].condition, WeatherCondition::Rain);
    assert_eq!(forecast[0].wind_speed, 18.0);
    assert_eq!(forecast[1].condition, WeatherCondition::Clear);
    // third day pads from the second: 21 + round(sin(2) * 3)
    assert_eq!(forecast[2].temperature, 24.0);
}

#[tokio::test]
async fn test_nominatim_lookup_and_overpass_attractions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .and(query_param("place_ids", "R123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "place_id": "R123",
            "display_name": "Kyoto, Kyoto Prefecture, Japan",
            "lat": "35.0116",
            "lon": "135.7681",
            "address": {"city": "Kyoto"}
        }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/interpreter"))
        .and(body_string_contains("out+center+5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "elements": [
                {"tags": {"name": "Fushimi Inari", "tourism": "attraction"}},
                {"tags": {"name": "Kyoto National Museum", "tourism": "museum", "name:en": "Kyoto National Museum"}},
                {"tags": {"name": "Maruyama Park", "tourism": "park"}},
                {"tags": {"tourism": "viewpoint"}}
            ]
        })))
        .mount(&server)
        .await;

    let client = NominatimClient::new(&PlacesConfig {
        nominatim_url: server.uri(),
        overpass_url: format!("{}/interpreter", server.uri()),
        ..PlacesConfig::default()
    })
    .unwrap();

    let kyoto = client.details("R123").await.unwrap();
    assert_eq!(kyoto.name, "Kyoto");
    assert_eq!(kyoto.country(), "Japan");

    let attractions = client.attractions(&kyoto, 5).await.unwrap();
    let names: Vec<&str> = attractions.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Fushimi Inari", "Kyoto National Museum", "Maruyama Park"]);
    assert_eq!(attractions[2].description, "park in Kyoto");
}

#[tokio::test]
async fn test_places_service_falls_back_to_mock_suggestions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let service = PlacesService::new(&PlacesConfig {
        nominatim_url: server.uri(),
        ..PlacesConfig::default()
    })
    .unwrap();
    let suggestions = service
        .search_places("tokyo tower", Some(PlacesProviderKind::Nominatim))
        .await;

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].main_text, "Tokyo");
}
