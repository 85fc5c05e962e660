use crate::{
    auth::{
        middleware::UserExtractor,
        password::{hash_password, verify_password},
    },
    database::{DatabaseError, dao::ProfileChanges, entities::UserRecord},
    error::AppError,
    server::Server,
};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Routes that do not need a token
pub fn create_user_public_routes() -> Router<Server> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Routes for the authenticated user
pub fn create_user_protected_routes() -> Router<Server> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/change-password", post(change_password))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserRecord,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn register(
    State(server): State<Server>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (Some(name), Some(email), Some(password)) = (
        non_blank(request.name),
        non_blank(request.email),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Name, email, and password are required fields".to_string(),
        ));
    };

    let users = server.database.users();
    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::BadRequest(
            "A user with this email already exists".to_string(),
        ));
    }

    let record = UserRecord::new(name, email, hash_password(&password)?)
        .with_phone_number(request.phone_number)
        .with_address(request.address);

    let user = users.create(&record).await.map_err(|e| match e {
        // Lost a race with a concurrent registration
        DatabaseError::Constraint(_) => {
            AppError::BadRequest("A user with this email already exists".to_string())
        }
        other => AppError::Database(other),
    })?;

    info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

async fn login(
    State(server): State<Server>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = server
        .database
        .users()
        .find_by_email(request.email.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(AppError::BadRequest("Invalid credentials".to_string()));
    }

    let token = server.jwt_service.issue_for_user(user.id)?;

    Ok(Json(LoginResponse { token, user }))
}

async fn get_profile(UserExtractor(user): UserExtractor) -> Json<UserRecord> {
    Json(user)
}

async fn update_profile(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserRecord>, AppError> {
    let changes = ProfileChanges {
        name: non_blank(request.name),
        phone_number: request.phone_number,
        address: request.address,
    };

    let updated = server.database.users().update_profile(user.id, changes).await?;
    Ok(Json(updated))
}

async fn change_password(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (Some(current), Some(new)) = (
        request.current_password.filter(|p| !p.is_empty()),
        request.new_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest(
            "Current password and new password are required".to_string(),
        ));
    };

    if !verify_password(&current, &user.password_hash) {
        return Err(AppError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    server
        .database
        .users()
        .update_password(user.id, hash_password(&new)?)
        .await?;

    info!(user_id = user.id, "Password changed");

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Password updated successfully"
    })))
}
