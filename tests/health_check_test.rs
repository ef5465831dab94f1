use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use wager_core::adapters::MemoryLedgerStore;
use wager_core::health::*;
use wager_core::middleware::idempotency::{
    CachedResponse, IdempotencyStatus, IdempotencyStore, MemoryIdempotencyStore,
};

struct UnreachableCache;

#[async_trait]
impl IdempotencyStore for UnreachableCache {
    async fn claim(&self, _key: &str) -> anyhow::Result<IdempotencyStatus> {
        anyhow::bail!("connection refused")
    }

    async fn store_response(&self, _key: &str, _response: CachedResponse) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }

    async fn release(&self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }

    async fn ping(&self) -> anyhow::Result<()> {
        anyhow::bail!("connection refused")
    }
}

#[test]
fn test_dependency_status_serialization() {
    let healthy = DependencyStatus::Healthy {
        status: "healthy".to_string(),
        latency_ms: 42,
    };

    let json = serde_json::to_value(&healthy).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["latency_ms"], 42);
    assert!(json.get("error").is_none());

    let unhealthy = DependencyStatus::Unhealthy {
        status: "unhealthy".to_string(),
        error: "timeout".to_string(),
    };

    let json = serde_json::to_value(&unhealthy).unwrap();
    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["error"], "timeout");
    assert!(json.get("latency_ms").is_none());
}

#[tokio::test]
async fn test_all_dependencies_healthy() {
    let report = check_health(
        LedgerStoreChecker::new(Arc::new(MemoryLedgerStore::new())),
        IdempotencyChecker::new(Arc::new(MemoryIdempotencyStore::new())),
        Instant::now(),
    )
    .await;

    assert_eq!(report.status, "healthy");
    assert_eq!(report.version, env!("CARGO_PKG_VERSION"));
    assert_eq!(report.dependencies.len(), 2);
    assert!(!report.is_unhealthy());
}

#[tokio::test]
async fn test_cache_outage_only_degrades() {
    let report = check_health(
        LedgerStoreChecker::new(Arc::new(MemoryLedgerStore::new())),
        IdempotencyChecker::new(Arc::new(UnreachableCache)),
        Instant::now(),
    )
    .await;

    assert_eq!(report.status, "degraded");
    match &report.dependencies[IDEMPOTENCY_CACHE] {
        DependencyStatus::Unhealthy { error, .. } => assert!(error.contains("connection refused")),
        other => panic!("expected unhealthy cache, got {:?}", other),
    }
    assert!(matches!(
        report.dependencies[LEDGER_STORE],
        DependencyStatus::Healthy { .. }
    ));
}
