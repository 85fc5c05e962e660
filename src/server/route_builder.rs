use crate::{
    auth::middleware::jwt_auth_middleware, config::CorsConfig, server::Server,
    utils::request_id::RequestIdExt,
};
use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Helpers for mounting route groups with their middleware
pub struct RouteHelpers;

impl RouteHelpers {
    /// Nest routes that require a valid bearer token
    pub fn with_jwt_auth(path: &str, routes: Router<Server>, server: &Server) -> Router<Server> {
        Router::new().nest(
            path,
            routes.layer(middleware::from_fn_with_state(
                server.clone(),
                jwt_auth_middleware,
            )),
        )
    }

    pub fn without_auth(path: &str, routes: Router<Server>) -> Router<Server> {
        Router::new().nest(path, routes)
    }
}

/// CORS policy. Listed origins may send credentials; an empty list allows
/// any origin without credentials.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins).allow_credentials(true)
}

pub mod middleware_factories {
    use super::*;
    use crate::database::entities::UserRecord;
    use axum::{
        body::Body,
        extract::{ConnectInfo, Request},
        middleware::Next,
        response::Response,
    };
    use std::net::SocketAddr;
    use tracing::info;

    /// Structured request/response log line for API and health routes
    pub async fn request_response_logger(req: Request<Body>, next: Next) -> Response {
        let path = req.uri().path().to_string();
        if !(path.starts_with("/api") || path.starts_with("/health")) {
            return next.run(req).await;
        }

        let method = req.method().to_string();
        let request_id = req.extensions().request_id().as_str();
        let ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|connect_info| connect_info.0.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        info!(
            method = %method,
            path = %path,
            ip = %ip,
            request_id = %request_id,
            "API request"
        );

        let start = std::time::Instant::now();
        let response = next.run(req).await;

        // Copied onto the response by the auth layer, which runs inside this one
        let user = response
            .extensions()
            .get::<UserRecord>()
            .map(|user| user.id.to_string())
            .unwrap_or_else(|| "anonymous".to_string());

        info!(
            method = %method,
            path = %path,
            status = %response.status().as_u16(),
            latency_ms = %start.elapsed().as_millis(),
            user = %user,
            request_id = %request_id,
            "API response"
        );

        response
    }
}
