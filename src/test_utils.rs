use crate::{
    auth::password::hash_password,
    config::Config,
    database::entities::UserRecord,
    server::Server,
};
use axum::{
    body::Body,
    http::{Request, header::CONTENT_TYPE},
    response::Response,
};

pub const TEST_PASSWORD: &str = "password123";

/// Builds a `Server` backed by a migrated in-memory SQLite database
pub struct TestServerBuilder {
    config: Config,
    jwt_secret: String,
}

impl TestServerBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            jwt_secret: "test-secret".to_string(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> Server {
        let mut config = self.config;
        config.database.url = "sqlite::memory:".to_string();
        config.jwt.secret = self.jwt_secret;
        config.jwt.algorithm = "HS256".to_string();
        config.logging.log_request = false;

        let server = Server::new(config).await.unwrap();
        server.database.migrate().await.unwrap();
        server
    }
}

/// Store a user whose password is `TEST_PASSWORD`
pub async fn create_test_user(server: &Server, email: &str) -> UserRecord {
    let name = email.split('@').next().unwrap_or(email);
    server
        .database
        .users()
        .create(&UserRecord::new(name, email, hash_password(TEST_PASSWORD).unwrap()))
        .await
        .unwrap()
}

/// A valid login token for the user
pub fn bearer(server: &Server, user_id: i32) -> String {
    server.jwt_service.issue_for_user(user_id).unwrap()
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn response_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
