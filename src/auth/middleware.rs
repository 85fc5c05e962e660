use crate::auth::jwt::JwtService;
use crate::database::DatabaseManager;
use crate::database::entities::UserRecord;
use crate::error::AppError;
use crate::server::Server;
use crate::utils::request_id::RequestIdExt;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{trace, warn};

/// JWT authentication middleware.
/// Resolves the bearer token to a `UserRecord` and stores it, with the
/// claims, in the request extensions. The user is also attached to the
/// response for the request logger.
pub async fn jwt_auth_middleware(
    State(server): State<Server>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let request_id = request.extensions().request_id().as_str();
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("No token, access denied".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization format".to_string()))?;

    let claims = server.jwt_service.validate_token(token)?;
    let user = get_user_record(claims.sub, &server.database, &request_id).await?;

    request.extensions_mut().insert(claims);
    request.extensions_mut().insert(user.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    Ok(response)
}

/// Authenticate with a JWT token and return the matching user
pub async fn authenticate_with_jwt(
    token: &str,
    database: &Arc<dyn DatabaseManager>,
    jwt_service: &Arc<dyn JwtService>,
    request_id: &str,
) -> Result<UserRecord, AppError> {
    let claims = jwt_service.validate_token(token)?;
    get_user_record(claims.sub, database, request_id).await
}

async fn get_user_record(
    user_id: i32,
    database: &Arc<dyn DatabaseManager>,
    request_id: &str,
) -> Result<UserRecord, AppError> {
    let user = database
        .users()
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| {
            warn!(user_id = %user_id, request_id = %request_id, "User not found");
            AppError::Unauthorized("Invalid token".to_string())
        })?;

    trace!(user_id = %user.id, email = %user.email, request_id = %request_id, "User authentication successful");
    Ok(user)
}

/// Custom extractor for UserRecord from request extensions
/// Use this in route handlers that need access to authenticated user information
pub struct UserExtractor(pub UserRecord);

impl<S> FromRequestParts<S> for UserExtractor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserRecord>()
            .cloned()
            .map(UserExtractor)
            .ok_or_else(|| AppError::Unauthorized("Missing user authentication".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::Claims;
    use crate::test_utils::{TestServerBuilder, create_test_user};
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
    };
    use tower::ServiceExt;

    async fn whoami(UserExtractor(user): UserExtractor) -> String {
        user.email
    }

    fn app(server: &Server) -> Router {
        Router::new()
            .route("/test", get(whoami))
            .layer(middleware::from_fn_with_state(
                server.clone(),
                jwt_auth_middleware,
            ))
    }

    fn request(auth: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri("/test");
        if let Some(auth) = auth {
            builder = builder.header("Authorization", auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let server = TestServerBuilder::new().build().await;
        let user = create_test_user(&server, "owner@example.com").await;
        let token = server.jwt_service.issue_for_user(user.id).unwrap();

        let response = app(&server)
            .oneshot(request(Some(format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(body.to_vec()).unwrap(), "owner@example.com");
    }

    #[tokio::test]
    async fn test_missing_header() {
        let server = TestServerBuilder::new().build().await;

        let response = app(&server).oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_format() {
        let server = TestServerBuilder::new().build().await;

        let response = app(&server)
            .oneshot(request(Some("Token abc".to_string())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_token_for_unknown_user() {
        let server = TestServerBuilder::new().build().await;
        let token = server
            .jwt_service
            .create_token(&Claims::new(9999, 3600))
            .unwrap();

        let response = app(&server)
            .oneshot(request(Some(format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_extractor_without_middleware() {
        let server = TestServerBuilder::new().build().await;
        let app: Router = Router::new().route("/test", get(whoami)).with_state(server);

        let response = app.oneshot(request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
