use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use coworking_frontend::components::{render_calendar, CalendarView, DayView};
use coworking_frontend::services::config::ApiConfig;
use coworking_frontend::services::date_utils::FixedClock;
use coworking_frontend::{
    ApiClient, AvailabilityApi, AvailabilityConfig, AvailabilityController, AvailabilityFetcher,
    AvailabilityQuery, ControllerOptions, FetchError, InMemoryAvailabilityCache, Phase,
};
use serde_json::json;
use shared::{ResourceType, ViewMode};

async fn availability(Path(space_id): Path<i64>, Query(params): Query<HashMap<String, String>>) -> Response {
    match space_id {
        500 => (StatusCode::INTERNAL_SERVER_ERROR, "error interno").into_response(),
        999 => (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => Json(json!({
            "query": params,
            "escritorios": [
                {"id": 1, "numero": 1, "disponible": true},
                {"id": 2, "numero": 2, "disponible": false}
            ]
        }))
        .into_response(),
    }
}

async fn spawn_server() -> anyhow::Result<String> {
    let app = Router::new().route("/api/espacios/disponibilidad/:space_id", get(availability));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{}", addr))
}

fn query(resource_id: i64) -> AvailabilityQuery {
    AvailabilityQuery {
        resource_id,
        date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        view_mode: ViewMode::Day,
        resource_type: ResourceType::Coworking,
    }
}

#[tokio::test]
async fn test_sends_date_view_and_space_type() -> anyhow::Result<()> {
    let client = ApiClient::with_base_url(spawn_server().await?);
    let body = client.get_availability(&query(7)).await?;

    assert_eq!(body["query"]["fecha"], "2024-06-10");
    assert_eq!(body["query"]["vista"], "day");
    assert_eq!(body["query"]["tipo_espacio"], "coworking");
    assert_eq!(body["escritorios"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() -> anyhow::Result<()> {
    let client = ApiClient::with_base_url(spawn_server().await?);
    match client.get_availability(&query(500)).await {
        Err(FetchError::Http { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "error interno");
        }
        other => panic!("expected http error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_non_json_body_is_contract_drift() -> anyhow::Result<()> {
    let client = ApiClient::with_base_url(spawn_server().await?);
    let error = client.get_availability(&query(999)).await.unwrap_err();
    assert!(error.is_contract_drift(), "{:?}", error);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_is_a_network_error() {
    let client = ApiClient::from_config(&ApiConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        ..ApiConfig::default()
    });
    let error = client.get_availability(&query(1)).await.unwrap_err();
    assert!(matches!(error, FetchError::Network(_)), "{:?}", error);
}

#[tokio::test]
async fn test_controller_renders_desks_from_live_endpoint() -> anyhow::Result<()> {
    let mut config = AvailabilityConfig::default();
    config.api.base_url = spawn_server().await?;
    let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

    let fetcher = AvailabilityFetcher::new(
        Arc::new(ApiClient::from_config(&config.api)),
        Arc::new(InMemoryAvailabilityCache::new()),
        &config,
    );
    let controller = AvailabilityController::new(
        fetcher,
        ControllerOptions::new(7, ResourceType::Coworking).clock(Arc::new(FixedClock(today))),
    );

    let mut updates = controller.subscribe();
    controller.mount();
    let state = tokio::time::timeout(Duration::from_secs(5), updates.wait_for(|s| s.phase == Phase::Ready))
        .await??
        .clone();

    match render_calendar(&state, &config, today) {
        CalendarView::Day(DayView::Coworking { cards, .. }) => {
            let labels: Vec<&str> = cards.iter().map(|card| card.classification.label.as_str()).collect();
            assert_eq!(labels, vec!["Disponible", "Ocupado"]);
        }
        other => panic!("expected desk cards, got {:?}", other),
    }

    // Malformed payloads are not cached and surface as the generic error
    controller.set_resource(999, ResourceType::Coworking);
    let failed = tokio::time::timeout(Duration::from_secs(5), updates.wait_for(|s| s.phase == Phase::Failed))
        .await??
        .clone();
    assert_eq!(
        failed.error.as_ref().map(|e| e.message()),
        Some("No se pudo cargar la disponibilidad")
    );
    Ok(())
}
