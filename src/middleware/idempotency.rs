use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::schemas::ErrorResponse;

pub const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";
pub const REPLAY_HEADER: &str = "x-idempotent-replay";

const IDEMPOTENCY_TTL: u64 = 86400; // 24 hours in seconds
const PROCESSING_TTL: u64 = 300;
const IDEMPOTENCY_PREFIX: &str = "idempotency:";
const PROCESSING_MARKER: &str = "PROCESSING";
const MAX_KEY_LEN: usize = 255;
const MAX_CACHED_BODY: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum IdempotencyStatus {
    New,
    Processing,
    Completed(CachedResponse),
}

/// Claims request keys and remembers the responses they produced.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Returns `New` and takes the processing lock if the key is unseen.
    async fn claim(&self, key: &str) -> anyhow::Result<IdempotencyStatus>;

    async fn store_response(&self, key: &str, response: CachedResponse) -> anyhow::Result<()>;

    /// Drops the processing lock so the request can be retried.
    async fn release(&self, key: &str) -> anyhow::Result<()>;

    async fn ping(&self) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct RedisIdempotencyStore {
    redis_client: redis::Client,
}

impl RedisIdempotencyStore {
    pub fn new(redis_url: &str) -> anyhow::Result<Self> {
        let redis_client = redis::Client::open(redis_url)?;
        Ok(Self { redis_client })
    }

    fn redis_key(key: &str) -> String {
        format!("{}{}", IDEMPOTENCY_PREFIX, key)
    }
}

#[async_trait]
impl IdempotencyStore for RedisIdempotencyStore {
    async fn claim(&self, key: &str) -> anyhow::Result<IdempotencyStatus> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let key = Self::redis_key(key);

        let claimed: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(PROCESSING_MARKER)
            .arg("NX")
            .arg("EX")
            .arg(PROCESSING_TTL)
            .query_async(&mut conn)
            .await?;
        if claimed.is_some() {
            return Ok(IdempotencyStatus::New);
        }

        let existing: Option<String> = conn.get(&key).await?;
        match existing {
            Some(value) if value != PROCESSING_MARKER => {
                let cached: CachedResponse = serde_json::from_str(&value)?;
                Ok(IdempotencyStatus::Completed(cached))
            }
            // Still processing, or expired between SET and GET; either way
            // the client should come back later.
            _ => Ok(IdempotencyStatus::Processing),
        }
    }

    async fn store_response(&self, key: &str, response: CachedResponse) -> anyhow::Result<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let serialized = serde_json::to_string(&response)?;
        let _: () = conn
            .set_ex(Self::redis_key(key), serialized, IDEMPOTENCY_TTL)
            .await?;
        Ok(())
    }

    async fn release(&self, key: &str) -> anyhow::Result<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(Self::redis_key(key)).await?;
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}

enum Entry {
    Processing(Instant),
    Completed(CachedResponse, Instant),
}

impl Entry {
    fn expired(&self, now: Instant) -> bool {
        match self {
            Entry::Processing(at) => now.duration_since(*at) > Duration::from_secs(PROCESSING_TTL),
            Entry::Completed(_, at) => {
                now.duration_since(*at) > Duration::from_secs(IDEMPOTENCY_TTL)
            }
        }
    }
}

/// Single-process idempotency cache, used when no Redis is configured.
#[derive(Clone, Default)]
pub struct MemoryIdempotencyStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryIdempotencyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdempotencyStore for MemoryIdempotencyStore {
    async fn claim(&self, key: &str) -> anyhow::Result<IdempotencyStatus> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, entry| !entry.expired(now));

        match entries.get(key) {
            Some(Entry::Processing(_)) => Ok(IdempotencyStatus::Processing),
            Some(Entry::Completed(cached, _)) => Ok(IdempotencyStatus::Completed(cached.clone())),
            None => {
                entries.insert(key.to_string(), Entry::Processing(now));
                Ok(IdempotencyStatus::New)
            }
        }
    }

    async fn store_response(&self, key: &str, response: CachedResponse) -> anyhow::Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), Entry::Completed(response, Instant::now()));
        Ok(())
    }

    async fn release(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

fn reject(status: StatusCode, message: &str, reason: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            message: message.to_string(),
            reason: reason.to_string(),
        }),
    )
        .into_response()
}

fn replay(cached: CachedResponse) -> Response {
    let status = StatusCode::from_u16(cached.status).unwrap_or(StatusCode::OK);
    let mut response = (status, cached.body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(REPLAY_HEADER, HeaderValue::from_static("true"));
    response
}

/// Makes POST handlers safe to retry when the client sends an
/// `x-idempotency-key` header. Requests without the header pass through.
pub async fn idempotency_middleware(
    State(store): State<Arc<dyn IdempotencyStore>>,
    request: Request,
    next: Next,
) -> Response {
    let client_key = match request.headers().get(IDEMPOTENCY_HEADER) {
        Some(key) => match key.to_str() {
            Ok(k) if !k.trim().is_empty() && k.len() <= MAX_KEY_LEN => k.trim().to_string(),
            _ => {
                return reject(
                    StatusCode::BAD_REQUEST,
                    "Invalid idempotency key format",
                    "BadRequest",
                );
            }
        },
        None => return next.run(request).await,
    };
    let key = format!("{}:{}:{}", request.method(), request.uri().path(), client_key);

    match store.claim(&key).await {
        Ok(IdempotencyStatus::New) => {
            let response = next.run(request).await;

            if !response.status().is_success() {
                if let Err(e) = store.release(&key).await {
                    tracing::error!("Failed to release idempotency lock: {}", e);
                }
                return response;
            }

            let (parts, body) = response.into_parts();
            let bytes = match axum::body::to_bytes(body, MAX_CACHED_BODY).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!("Failed to buffer response for idempotency cache: {}", e);
                    if let Err(e) = store.release(&key).await {
                        tracing::error!("Failed to release idempotency lock: {}", e);
                    }
                    return reject(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Response could not be recorded",
                        "Internal",
                    );
                }
            };

            let cached = CachedResponse {
                status: parts.status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            };
            if let Err(e) = store.store_response(&key, cached).await {
                tracing::error!(key = %key, "Failed to store idempotency response: {}", e);
                if let Err(e) = store.release(&key).await {
                    tracing::error!(
                        key = %key,
                        "Failed to release idempotency lock, key stays in progress until it expires: {}",
                        e
                    );
                }
            }

            Response::from_parts(parts, Body::from(bytes))
        }
        Ok(IdempotencyStatus::Processing) => reject(
            StatusCode::CONFLICT,
            "Request is currently being processed",
            "RequestInProgress",
        ),
        Ok(IdempotencyStatus::Completed(cached)) => {
            tracing::debug!(key = %key, "Replaying cached response");
            replay(cached)
        }
        Err(e) => {
            tracing::error!("Idempotency check failed: {}", e);
            // Fail open: the cache being down must not take the ledger down.
            next.run(request).await
        }
    }
}
