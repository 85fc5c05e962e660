use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

pub const SERVICE_NAME: &str = "invoice-desk";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl HealthCheckResult {
    fn build(
        status: HealthStatus,
        message: Option<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            status,
            message,
            details,
            duration_ms: None,
        }
    }

    pub fn healthy() -> Self {
        Self::build(HealthStatus::Healthy, None, None)
    }

    pub fn healthy_with_details(details: serde_json::Value) -> Self {
        Self::build(HealthStatus::Healthy, None, Some(details))
    }

    pub fn degraded(message: String) -> Self {
        Self::build(HealthStatus::Degraded, Some(message), None)
    }

    pub fn unhealthy(message: String) -> Self {
        Self::build(HealthStatus::Unhealthy, Some(message), None)
    }

    pub fn unhealthy_with_details(message: String, details: serde_json::Value) -> Self {
        Self::build(HealthStatus::Unhealthy, Some(message), Some(details))
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// A component that can report on its own health
#[async_trait]
pub trait HealthChecker: Send + Sync {
    fn name(&self) -> &str;

    async fn check(&self) -> HealthCheckResult;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallHealthResponse {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub checks: HashMap<String, HealthCheckResult>,
    pub summary: HealthSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total_checks: usize,
    pub healthy_count: usize,
    pub degraded_count: usize,
    pub unhealthy_count: usize,
    pub total_duration_ms: u64,
}

impl HealthSummary {
    fn record(&mut self, result: &HealthCheckResult) {
        self.total_checks += 1;
        self.total_duration_ms += result.duration_ms.unwrap_or(0);
        match result.status {
            HealthStatus::Healthy => self.healthy_count += 1,
            HealthStatus::Degraded => self.degraded_count += 1,
            HealthStatus::Unhealthy => self.unhealthy_count += 1,
        }
    }

    /// Worst status wins
    fn overall_status(&self) -> HealthStatus {
        if self.unhealthy_count > 0 {
            HealthStatus::Unhealthy
        } else if self.degraded_count > 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}

/// Registry of component health checks behind `GET /health`
#[derive(Default)]
pub struct HealthService {
    checkers: Arc<RwLock<HashMap<String, Arc<dyn HealthChecker>>>>,
}

impl HealthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, checker: Arc<dyn HealthChecker>) {
        let name = checker.name().to_string();
        self.checkers.write().await.insert(name, checker);
    }

    pub async fn registered_checkers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.checkers.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Run the checks selected by `filter`: `"all"`, a single component
    /// name, or nothing for a liveness-only answer.
    pub async fn check_health(&self, filter: Option<&str>) -> OverallHealthResponse {
        let checkers = self.checkers.read().await;
        let mut checks = HashMap::new();
        let mut summary = HealthSummary::default();

        let selected = checkers.iter().filter(|(name, _)| match filter {
            Some("all") => true,
            Some(specific) => name.as_str() == specific,
            None => false,
        });

        for (name, checker) in selected {
            let start = Instant::now();
            let result = checker
                .check()
                .await
                .with_duration(start.elapsed().as_millis() as u64);
            summary.record(&result);
            checks.insert(name.clone(), result);
        }

        OverallHealthResponse {
            status: summary.overall_status(),
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            checks,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedChecker {
        name: &'static str,
        result: HealthCheckResult,
    }

    #[async_trait]
    impl HealthChecker for FixedChecker {
        fn name(&self) -> &str {
            self.name
        }

        async fn check(&self) -> HealthCheckResult {
            self.result.clone()
        }
    }

    fn checker(name: &'static str, result: HealthCheckResult) -> Arc<dyn HealthChecker> {
        Arc::new(FixedChecker { name, result })
    }

    #[tokio::test]
    async fn test_liveness_runs_no_checks() {
        let service = HealthService::new();
        service
            .register(checker("database", HealthCheckResult::unhealthy("down".into())))
            .await;

        let response = service.check_health(None).await;
        assert_eq!(response.status, HealthStatus::Healthy);
        assert_eq!(response.service, "invoice-desk");
        assert!(response.checks.is_empty());
        assert_eq!(response.summary.total_checks, 0);
    }

    #[tokio::test]
    async fn test_worst_status_wins() {
        let service = HealthService::new();
        service
            .register(checker("database", HealthCheckResult::healthy()))
            .await;
        service
            .register(checker("jwt", HealthCheckResult::degraded("slow".into())))
            .await;

        let response = service.check_health(Some("all")).await;
        assert_eq!(response.status, HealthStatus::Degraded);
        assert_eq!(response.summary.total_checks, 2);
        assert_eq!(response.summary.healthy_count, 1);
        assert_eq!(response.summary.degraded_count, 1);

        service
            .register(checker("jwt", HealthCheckResult::unhealthy("broken".into())))
            .await;
        let response = service.check_health(Some("all")).await;
        assert_eq!(response.status, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_single_component_filter() {
        let service = HealthService::new();
        service
            .register(checker("database", HealthCheckResult::healthy()))
            .await;
        service
            .register(checker("jwt", HealthCheckResult::unhealthy("broken".into())))
            .await;

        let response = service.check_health(Some("database")).await;
        assert_eq!(response.status, HealthStatus::Healthy);
        assert!(response.checks.contains_key("database"));
        assert!(!response.checks.contains_key("jwt"));
        assert_eq!(
            service.registered_checkers().await,
            vec!["database".to_string(), "jwt".to_string()]
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let value = serde_json::to_value(HealthCheckResult::healthy().with_duration(3)).unwrap();
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["duration_ms"], 3);
        assert!(value.get("message").is_none());
    }
}
