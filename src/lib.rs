pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod openapi;
pub mod ports;
pub mod schemas;
pub mod services;
pub mod utils;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::adapters::{MemoryLedgerStore, PostgresLedgerStore};
use crate::config::Config;
use crate::middleware::idempotency::{
    idempotency_middleware, IdempotencyStore, MemoryIdempotencyStore, RedisIdempotencyStore,
};
use crate::middleware::request_logger::request_logger_middleware;
use crate::ports::LedgerStore;
use crate::services::{AccountRegistry, BalanceEngine, BetResolver, RandomSource, ThreadRandom};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub registry: AccountRegistry,
    pub engine: BalanceEngine,
    pub idempotency: Arc<dyn IdempotencyStore>,
    pub log_request_body: bool,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        random: Arc<dyn RandomSource>,
        idempotency: Arc<dyn IdempotencyStore>,
    ) -> Self {
        Self {
            registry: AccountRegistry::new(store.clone(), random.clone()),
            engine: BalanceEngine::new(store.clone(), BetResolver::new(random)),
            store,
            idempotency,
            log_request_body: false,
            start_time: Instant::now(),
        }
    }

    pub fn with_limits(mut self, id_generation_attempts: u32, balance_retry_attempts: u32) -> Self {
        self.registry = self.registry.with_max_id_attempts(id_generation_attempts);
        self.engine = self.engine.with_max_attempts(balance_retry_attempts);
        self
    }

    pub fn with_request_body_logging(mut self, enabled: bool) -> Self {
        self.log_request_body = enabled;
        self
    }
}

/// Wires the configured backends: Postgres and Redis when their URLs are
/// set, in-memory stand-ins otherwise.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let store: Arc<dyn LedgerStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PostgresLedgerStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, ledger is kept in memory and lost on restart");
            Arc::new(MemoryLedgerStore::new())
        }
    };

    let idempotency: Arc<dyn IdempotencyStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisIdempotencyStore::new(url)?),
        None => {
            tracing::info!("REDIS_URL not set, idempotency keys are cached in memory");
            Arc::new(MemoryIdempotencyStore::new())
        }
    };

    Ok(AppState::new(store, Arc::new(ThreadRandom), idempotency)
        .with_limits(config.id_generation_attempts, config.balance_retry_attempts)
        .with_request_body_logging(config.log_request_body))
}

pub fn create_app(state: AppState) -> Router {
    let ledger_routes = Router::new()
        .route("/api/register", post(handlers::accounts::register))
        .route("/api/deposit", post(handlers::operations::deposit))
        .route("/api/withdraw", post(handlers::operations::withdraw))
        .route("/api/bet", post(handlers::operations::place_bet))
        .route_layer(axum::middleware::from_fn_with_state(
            state.idempotency.clone(),
            idempotency_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/accounts/:account_id", get(handlers::accounts::get_account))
        .route(
            "/api/accounts/:account_id/transactions",
            get(handlers::accounts::list_transactions),
        )
        .route(
            "/api/accounts/:account_id/wagers",
            get(handlers::accounts::list_wagers),
        )
        .merge(ledger_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(axum::middleware::from_fn_with_state(
            state.log_request_body,
            request_logger_middleware,
        ))
        .with_state(state)
}
