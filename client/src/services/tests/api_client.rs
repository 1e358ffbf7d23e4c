//! Tests for RealApiClient against a stub HTTP server
//!
//! These cover request shapes, response parsing for both player payload
//! variants, and the mapping of transport and remote failures.

use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared::{OptimizationRequest, Position};
use super::common::{client_for, client_with_timeout};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::services::RealApiClient;
use crate::traits::ApiClient;

/// Players endpoint returns raw upstream columns
#[tokio::test]
async fn test_get_players_parses_upstream_columns() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/players"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "web_name": "Raya", "team": 1, "position_name": "GKP", "now_cost": 55, "predicted_points": 4.1},
            {"id": 2, "web_name": "Haaland", "team": "MCI", "position_name": "FWD", "now_cost": "150", "predicted_points": "8.7"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let players = client_for(&server).get_players().await.unwrap();

    assert_eq!(players.len(), 2);
    assert_eq!(players[0].name, "Raya");
    assert_eq!(players[0].team, "1");
    assert_eq!(players[0].price, 5.5);
    assert_eq!(players[1].position, Position::FWD);
    assert_eq!(players[1].predicted_points, 8.7);
}

#[tokio::test]
async fn test_optimize_posts_request_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/optimize"))
        .and(body_json(json!({"budget": 100.0, "exclude_players": [7, 12]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "Optimal",
            "players": [
                {"id": 3, "name": "Saliba", "team": "ARS", "position": "DEF", "price": 6.0, "predicted_points": 5.2}
            ],
            "total_cost": 99.5,
            "total_predicted_points": 312.4,
            "remaining_budget": 0.5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = OptimizationRequest::new(100.0).with_excluded([12, 7, 7]);
    let result = client_for(&server).optimize_team(&request).await.unwrap();

    assert_eq!(result.status.as_deref(), Some("Optimal"));
    assert_eq!(result.players[0].position, Position::DEF);
    assert_eq!(result.total_cost, 99.5);
    assert_eq!(result.remaining_budget, 0.5);
}

#[tokio::test]
async fn test_top_players_sends_position_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/top-players/MID"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 9, "web_name": "Palmer", "team": 4, "now_cost": 105, "total_points": 180, "form": "7.5"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let top = client_for(&server).get_top_players(Position::MID, 5).await.unwrap();

    assert_eq!(top[0].web_name, "Palmer");
    assert_eq!(top[0].price(), Some(10.5));
    assert_eq!(top[0].form, Some(7.5));
}

#[tokio::test]
async fn test_position_stats_and_housekeeping_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/position-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"position_name": "GKP", "predicted_points_mean": 2.0, "predicted_points_max": 6.0, "price_mean": 4.6}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy", "model_status": "trained", "predictions_available": 612
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/refresh-data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Data refreshed successfully", "players_updated": 612
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/model-info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model_type": "RandomForestRegressor",
            "features_used": 14,
            "position_models": {"GKP": {"n_estimators": 100, "trained": true}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let stats = client.get_position_stats().await.unwrap();
    assert_eq!(stats[0].position_name, Position::GKP);

    let health = client.health_check().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.predictions_available, Some(612));

    let summary = client.refresh_data().await.unwrap();
    assert_eq!(summary.players_updated, 612);
    assert_eq!(summary.predictions_updated, 0);

    let info = client.get_model_info().await.unwrap();
    assert_eq!(info.features_used, 14);
    assert!(info.position_models["GKP"].trained);
}

#[tokio::test]
async fn test_remote_error_detail_is_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/optimize"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "Optimization failed"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .optimize_team(&OptimizationRequest::new(100.0))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::Remote {
            status: 400,
            body: "Optimization failed".to_string()
        }
    );
}

#[tokio::test]
async fn test_slow_response_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/players"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let err = client_with_timeout(&server, Duration::from_millis(50))
        .get_players()
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ClientError::Timeout {
            endpoint: "/api/players".to_string()
        }
    );
}

#[tokio::test]
async fn test_shape_mismatch_maps_to_validation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/players"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"players": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/analytics/position-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"position_name": "COACH", "predicted_points_mean": 1.0, "predicted_points_max": 1.0, "price_mean": 1.0}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);

    assert!(matches!(client.get_players().await, Err(ClientError::Validation { .. })));
    assert!(matches!(client.get_position_stats().await, Err(ClientError::Validation { .. })));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let config = ClientConfig::default()
        .with_base_url("http://127.0.0.1:1")
        .with_timeout(Duration::from_secs(2));
    let client = RealApiClient::new(&config).unwrap();

    let err = client.health_check().await.unwrap_err();
    assert!(matches!(err, ClientError::Network { .. }));
    assert!(err.is_transport());
}
