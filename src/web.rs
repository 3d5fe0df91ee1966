//! Axum-based HTTP API with OpenAPI (utoipa) and Swagger UI
//!
//! Everything except `/api/refresh` is a pure read of the cached dataset; the
//! refresh endpoint is forwarded to the poll loop so refreshes stay serialised.

use crate::config::Config;
use crate::error::{Result, SpotovaError};
use crate::prices::resolver::build_forecast_map;
use crate::prices::{CoordinatorHandle, Resolution};
use crate::sensor::SensorSet;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: CoordinatorHandle,
    pub sensors: Arc<SensorSet>,
    pub config: Arc<Config>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RefreshParams {
    /// Fetch even if the current slot was already refreshed
    pub force: Option<bool>,
}

#[utoipa::path(get, path = "/api/health", responses(
    (status = 200, description = "Service is healthy")
))]
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

#[utoipa::path(get, path = "/api/status", responses(
    (status = 200, description = "Coordinator status")
))]
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let handle = &state.coordinator;
    Json(serde_json::json!({
        "version": env!("APP_VERSION"),
        "timezone": handle.timezone().name(),
        "local_time": handle.local_now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        "poll_interval_secs": state.config.coordinator.poll_interval_secs,
        "coordinator": handle.status(),
    }))
}

#[utoipa::path(get, path = "/api/sensors", responses(
    (status = 200, description = "All sensor readings, evaluated now")
))]
pub async fn list_sensors(State(state): State<AppState>) -> impl IntoResponse {
    let dataset = state.coordinator.dataset();
    let now = state.coordinator.local_now();
    Json(state.sensors.read_all(dataset.as_deref(), now))
}

#[utoipa::path(get, path = "/api/sensors/{id}",
    params(("id" = String, Path, description = "Sensor unique id")),
    responses(
        (status = 200, description = "Sensor reading"),
        (status = 404, description = "Unknown sensor")
    )
)]
pub async fn get_sensor(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let Some(spec) = state.sensors.get(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("unknown sensor '{}'", id)})),
        );
    };
    let dataset = state.coordinator.dataset();
    let reading = state
        .sensors
        .read(spec, dataset.as_deref(), state.coordinator.local_now());
    (
        StatusCode::OK,
        Json(serde_json::to_value(reading).unwrap_or(serde_json::json!({"error":"serialization"}))),
    )
}

#[utoipa::path(get, path = "/api/prices", responses(
    (status = 200, description = "Cached price dataset and per-kWh forecasts")
))]
pub async fn prices(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.coordinator.status();
    let Some(dataset) = state.coordinator.dataset() else {
        return Json(serde_json::json!({
            "dataset": null,
            "source": status.source,
            "unit": state.config.unit_label(),
            "forecast_today": {},
            "forecast_tomorrow": {},
        }));
    };
    Json(serde_json::json!({
        "dataset": &*dataset,
        "source": status.source,
        "unit": state.config.unit_label(),
        "resolution_today_minutes": Resolution::of(&dataset.hours_today).minutes(),
        "resolution_tomorrow_minutes": Resolution::of(&dataset.hours_tomorrow).minutes(),
        "forecast_today": build_forecast_map(&dataset.hours_today),
        "forecast_tomorrow": build_forecast_map(&dataset.hours_tomorrow),
    }))
}

#[utoipa::path(post, path = "/api/refresh", params(RefreshParams), responses(
    (status = 200, description = "Refresh finished, cache updated or still current"),
    (status = 502, description = "Both price endpoints failed; cached data kept"),
    (status = 503, description = "Poll loop is not running")
))]
pub async fn refresh(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> impl IntoResponse {
    match state
        .coordinator
        .request_refresh(params.force.unwrap_or(false))
        .await
    {
        Ok(status) => (
            StatusCode::OK,
            Json(serde_json::json!({"ok": true, "coordinator": status})),
        ),
        Err(e) => {
            let code = match e {
                SpotovaError::UpdateFailed { .. } => StatusCode::BAD_GATEWAY,
                _ => StatusCode::SERVICE_UNAVAILABLE,
            };
            (
                code,
                Json(serde_json::json!({
                    "error": e.to_string(),
                    "coordinator": state.coordinator.status(),
                })),
            )
        }
    }
}

#[utoipa::path(get, path = "/api/events", responses((status = 200, description = "SSE stream of refresh events")))]
pub async fn events(State(state): State<AppState>) -> impl IntoResponse {
    let rx = state.coordinator.subscribe_events();
    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok::<Event, std::convert::Infallible>(
            Event::default().event("refresh").data(payload),
        )),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[utoipa::path(get, path = "/api/config", responses((status = 200)))]
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(
        serde_json::to_value(&*state.config)
            .unwrap_or(serde_json::json!({"error":"serialization"})),
    )
}

#[utoipa::path(get, path = "/api/config/schema", responses((status = 200)))]
pub async fn get_config_schema() -> impl IntoResponse {
    let schema = schemars::schema_for!(crate::config::Config);
    Json(serde_json::to_value(&schema).unwrap_or(serde_json::json!({"error":"schema"})))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health, status, list_sensors, get_sensor, prices, refresh, events,
        get_config, get_config_schema,
    ),
    components(schemas(RefreshParams)),
    tags((name = "spotova", description = "Spot electricity price API"))
)]
pub struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let openapi = ApiDoc::openapi();

    Router::new()
        .route("/api/health", get(health))
        .route("/api/status", get(status))
        .route("/api/sensors", get(list_sensors))
        .route("/api/sensors/{id}", get(get_sensor))
        .route("/api/prices", get(prices))
        .route("/api/refresh", post(refresh))
        .route("/api/events", get(events))
        .route("/api/config", get(get_config))
        .route("/api/config/schema", get(get_config_schema))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", openapi))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let router = build_router(state);

    let logger = crate::logging::get_logger("web");
    logger.info(&format!(
        "Starting web server; requested host={}, port={}",
        host, port
    ));

    let addr = match host.parse::<IpAddr>() {
        Ok(ip) => SocketAddr::new(ip, port),
        Err(_) => {
            logger.warn(&format!("Invalid host '{}'; falling back to 127.0.0.1", host));
            ([127, 0, 0, 1], port).into()
        }
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SpotovaError::web(format!("Failed to bind {}: {}", addr, e)))?;
    let local_addr = listener.local_addr()?;
    logger.info(&format!(
        "Web server listening at http://{}:{} (API /api, docs /docs)",
        local_addr.ip(),
        local_addr.port()
    ));

    axum::serve(listener, router)
        .await
        .map_err(|e| SpotovaError::web(format!("Server stopped: {}", e)))
}
