use crate::{
    health::{HealthStatus, OverallHealthResponse},
    server::Server,
};
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct HealthCheckQuery {
    #[serde(default)]
    check: Option<String>,
}

/// `GET /health` for liveness, `?check=all` or `?check=<component>` to run checks
pub fn create_health_routes() -> Router<Server> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(
    State(server): State<Server>,
    Query(params): Query<HealthCheckQuery>,
) -> (StatusCode, Json<OverallHealthResponse>) {
    let response = server
        .health_service
        .check_health(params.check.as_deref())
        .await;

    let status = match response.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (status, Json(response))
}
