use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use invoice_desk::{Config, Server, auth::jwt::Claims};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

/// Unified test harness: an app on a fresh in-memory database plus helpers
/// for driving it over HTTP.
pub struct TestHarness {
    pub server: Server,
    pub app: Router,
    pub jwt_secret: String,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_secret("integration-test-secret").await
    }

    pub async fn with_secret(secret: &str) -> Self {
        let mut config = Config::default();
        config.jwt.secret = secret.to_string();
        config.database.url = "sqlite::memory:".to_string();
        config.logging.log_request = false;

        let server = Server::new(config).await.unwrap();
        server.database.migrate().await.unwrap();
        let app = server.create_app();

        Self {
            server,
            app,
            jwt_secret: secret.to_string(),
        }
    }

    pub async fn make_request(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Send a JSON request and return status plus parsed body (`Null` when empty)
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.make_request(RequestBuilder::json(method, uri, token, body)).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Register through the API and log in; returns `(user id, token)`
    pub async fn register_and_login(&self, name: &str, email: &str) -> (i32, String) {
        let (status, _) = self
            .call(
                "POST",
                "/api/users/register",
                None,
                Some(json!({"name": name, "email": email, "password": "s3cret-pass"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .call(
                "POST",
                "/api/users/login",
                None,
                Some(json!({"email": email, "password": "s3cret-pass"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let user_id = body["user"]["id"].as_i64().unwrap() as i32;
        let token = body["token"].as_str().unwrap().to_string();
        (user_id, token)
    }

    /// Create a customer over HTTP and return its id
    #[allow(dead_code)]
    pub async fn create_customer(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .call("POST", "/api/customers", Some(token), Some(json!({"name": name})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    /// Sign arbitrary claims with the harness secret
    #[allow(dead_code)]
    pub fn create_token(&self, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )
        .unwrap()
    }
}

pub struct RequestBuilder;

impl RequestBuilder {
    pub fn json(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }
}
