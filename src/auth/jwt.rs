use crate::error::AppError;
use crate::health::{HealthCheckResult, HealthChecker};
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

/// Parse a configured signing algorithm. Tokens are both issued and verified
/// here from one shared secret, so only the HMAC family is accepted.
pub fn parse_algorithm(alg: &str) -> Result<Algorithm, AppError> {
    match Algorithm::from_str(alg) {
        Ok(algorithm @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(algorithm),
        Ok(_) => Err(AppError::BadRequest(format!(
            "JWT algorithm {} needs a key pair; use HS256, HS384 or HS512",
            alg
        ))),
        Err(_) => Err(AppError::BadRequest(format!(
            "Unsupported JWT algorithm: {}",
            alg
        ))),
    }
}

/// Claims of a login session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // Database user ID
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: i32, expires_in_seconds: u64) -> Self {
        let now = Utc::now().timestamp() as usize;
        Self {
            sub: user_id,
            iat: now,
            exp: now + expires_in_seconds as usize,
        }
    }
}

/// Token signing and verification, behind a trait so handlers hold `Arc<dyn JwtService>`
pub trait JwtService: Send + Sync {
    fn create_token(&self, claims: &Claims) -> Result<String, AppError>;

    /// Validate signature and expiry and return the claims
    fn validate_token(&self, token: &str) -> Result<Claims, AppError>;

    /// Issue a login token with the configured lifetime
    fn issue_for_user(&self, user_id: i32) -> Result<String, AppError>;
}

#[derive(Clone)]
pub struct JwtServiceImpl {
    algorithm: Algorithm,
    expiry_seconds: u64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtServiceImpl {
    pub fn new(secret: &str, algorithm: Algorithm, expiry_seconds: u64) -> Result<Self, AppError> {
        if secret.is_empty() {
            return Err(AppError::Internal("jwt.secret must be set".to_string()));
        }

        Ok(Self {
            algorithm,
            expiry_seconds,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn health_checker(&self) -> Arc<JwtHealthChecker> {
        Arc::new(JwtHealthChecker {
            service: self.clone(),
        })
    }
}

impl JwtService for JwtServiceImpl {
    fn create_token(&self, claims: &Claims) -> Result<String, AppError> {
        let header = Header::new(self.algorithm);
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        Ok(token_data.claims)
    }

    fn issue_for_user(&self, user_id: i32) -> Result<String, AppError> {
        self.create_token(&Claims::new(user_id, self.expiry_seconds))
    }
}

/// Health checker implementation for JWT service
pub struct JwtHealthChecker {
    service: JwtServiceImpl,
}

#[async_trait]
impl HealthChecker for JwtHealthChecker {
    fn name(&self) -> &str {
        "jwt"
    }

    async fn check(&self) -> HealthCheckResult {
        let test_claims = Claims::new(1, 60);
        let algorithm = format!("{:?}", self.service.algorithm);

        let token = match self.service.create_token(&test_claims) {
            Ok(token) => token,
            Err(err) => {
                return HealthCheckResult::unhealthy_with_details(
                    "Failed to create test JWT token".to_string(),
                    serde_json::json!({
                        "algorithm": algorithm,
                        "token_creation": "failed",
                        "error": err.to_string()
                    }),
                );
            }
        };

        match self.service.validate_token(&token) {
            Ok(validated) if validated.sub == test_claims.sub => {
                HealthCheckResult::healthy_with_details(serde_json::json!({
                    "algorithm": algorithm,
                    "token_creation": "success",
                    "token_validation": "success"
                }))
            }
            Ok(_) => HealthCheckResult::unhealthy_with_details(
                "Token validation returned incorrect claims".to_string(),
                serde_json::json!({
                    "algorithm": algorithm,
                    "token_validation": "failed",
                    "error": "claims mismatch"
                }),
            ),
            Err(err) => HealthCheckResult::unhealthy_with_details(
                "Failed to validate test JWT token".to_string(),
                serde_json::json!({
                    "algorithm": algorithm,
                    "token_validation": "failed",
                    "error": err.to_string()
                }),
            ),
        }
    }
}
