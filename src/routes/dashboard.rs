use crate::{
    auth::middleware::UserExtractor,
    dashboard::{DashboardStats, SalesPeriod, SalesPoint},
    error::AppError,
    server::Server,
};
use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::get,
};
use chrono::Utc;

pub fn create_dashboard_routes() -> Router<Server> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/sales/{period}", get(get_sales))
}

async fn get_stats(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = server.dashboard.stats(user.id, Utc::now()).await?;
    Ok(Json(stats))
}

async fn get_sales(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Path(period): Path<String>,
) -> Result<Json<Vec<SalesPoint>>, AppError> {
    let period: SalesPeriod = period.parse()?;
    let points = server.dashboard.sales(user.id, period, Utc::now()).await?;
    Ok(Json(points))
}
