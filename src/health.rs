use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use utoipa::ToSchema;

use crate::middleware::idempotency::IdempotencyStore;
use crate::ports::LedgerStore;

pub const LEDGER_STORE: &str = "ledger_store";
pub const IDEMPOTENCY_CACHE: &str = "idempotency_cache";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub dependencies: HashMap<String, DependencyStatus>,
}

impl HealthResponse {
    pub fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DependencyStatus {
    Healthy { status: String, latency_ms: u64 },
    Unhealthy { status: String, error: String },
}

impl DependencyStatus {
    fn healthy(start: Instant) -> Self {
        DependencyStatus::Healthy {
            status: "healthy".to_string(),
            latency_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn unhealthy(error: impl ToString) -> Self {
        DependencyStatus::Unhealthy {
            status: "unhealthy".to_string(),
            error: error.to_string(),
        }
    }
}

#[async_trait]
pub trait DependencyChecker: Send + Sync {
    async fn check(&self) -> DependencyStatus;
}

pub struct LedgerStoreChecker {
    store: Arc<dyn LedgerStore>,
}

impl LedgerStoreChecker {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DependencyChecker for LedgerStoreChecker {
    async fn check(&self) -> DependencyStatus {
        let start = Instant::now();
        match self.store.ping().await {
            Ok(()) => DependencyStatus::healthy(start),
            Err(e) => DependencyStatus::unhealthy(e),
        }
    }
}

pub struct IdempotencyChecker {
    store: Arc<dyn IdempotencyStore>,
}

impl IdempotencyChecker {
    pub fn new(store: Arc<dyn IdempotencyStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl DependencyChecker for IdempotencyChecker {
    async fn check(&self) -> DependencyStatus {
        let start = Instant::now();
        match self.store.ping().await {
            Ok(()) => DependencyStatus::healthy(start),
            Err(e) => DependencyStatus::unhealthy(e),
        }
    }
}

pub async fn check_health(
    ledger: LedgerStoreChecker,
    idempotency: IdempotencyChecker,
    start_time: Instant,
) -> HealthResponse {
    let timeout_duration = Duration::from_secs(5);

    let (ledger_result, idempotency_result) = tokio::join!(
        timeout(timeout_duration, ledger.check()),
        timeout(timeout_duration, idempotency.check())
    );

    let mut dependencies = HashMap::new();
    dependencies.insert(
        LEDGER_STORE.to_string(),
        ledger_result.unwrap_or_else(|_| DependencyStatus::unhealthy("timeout")),
    );
    dependencies.insert(
        IDEMPOTENCY_CACHE.to_string(),
        idempotency_result.unwrap_or_else(|_| DependencyStatus::unhealthy("timeout")),
    );

    HealthResponse {
        status: determine_overall_status(&dependencies),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.elapsed().as_secs(),
        dependencies,
    }
}

fn determine_overall_status(dependencies: &HashMap<String, DependencyStatus>) -> String {
    let critical_deps = [LEDGER_STORE];
    let mut has_critical_failure = false;
    let mut has_non_critical_failure = false;

    for (name, status) in dependencies {
        if matches!(status, DependencyStatus::Unhealthy { .. }) {
            if critical_deps.contains(&name.as_str()) {
                has_critical_failure = true;
            } else {
                has_non_critical_failure = true;
            }
        }
    }

    if has_critical_failure {
        "unhealthy".to_string()
    } else if has_non_critical_failure {
        "degraded".to_string()
    } else {
        "healthy".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(ledger_ok: bool, cache_ok: bool) -> HashMap<String, DependencyStatus> {
        let status = |ok: bool| {
            if ok {
                DependencyStatus::Healthy {
                    status: "healthy".to_string(),
                    latency_ms: 1,
                }
            } else {
                DependencyStatus::unhealthy("connection refused")
            }
        };
        HashMap::from([
            (LEDGER_STORE.to_string(), status(ledger_ok)),
            (IDEMPOTENCY_CACHE.to_string(), status(cache_ok)),
        ])
    }

    #[test]
    fn test_overall_status() {
        assert_eq!(determine_overall_status(&deps(true, true)), "healthy");
        assert_eq!(determine_overall_status(&deps(true, false)), "degraded");
        assert_eq!(determine_overall_status(&deps(false, true)), "unhealthy");
    }

    #[test]
    fn test_dependency_status_serialization() {
        let json = serde_json::to_value(DependencyStatus::unhealthy("timeout")).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["error"], "timeout");
        assert!(json.get("latency_ms").is_none());
    }
}
