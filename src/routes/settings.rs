use crate::{
    auth::middleware::UserExtractor,
    database::{dao::SettingsChanges, entities::SettingsRecord},
    error::AppError,
    server::Server,
};
use axum::{
    Router,
    extract::State,
    response::Json,
    routing::get,
};
use serde::Deserialize;
use tracing::info;

pub fn create_settings_routes() -> Router<Server> {
    Router::new().route("/", get(get_settings).put(update_settings))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRequest {
    pub home: Option<String>,
    pub logo: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub address: Option<String>,
    pub business_name: Option<String>,
}

impl From<SettingsRequest> for SettingsChanges {
    fn from(request: SettingsRequest) -> Self {
        Self {
            home: request.home,
            logo: request.logo,
            language: request.language,
            country: request.country,
            address: request.address,
            business_name: request.business_name,
        }
    }
}

/// `null` until the user saves settings for the first time
async fn get_settings(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
) -> Result<Json<Option<SettingsRecord>>, AppError> {
    let settings = server.database.settings().find_by_user(user.id).await?;
    Ok(Json(settings))
}

async fn update_settings(
    State(server): State<Server>,
    UserExtractor(user): UserExtractor,
    Json(request): Json<SettingsRequest>,
) -> Result<Json<SettingsRecord>, AppError> {
    let settings = server
        .database
        .settings()
        .upsert(user.id, request.into())
        .await?;
    info!(user_id = user.id, settings_id = settings.id, "Settings saved");

    Ok(Json(settings))
}
