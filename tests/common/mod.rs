#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wager_core::adapters::MemoryLedgerStore;
use wager_core::middleware::idempotency::MemoryIdempotencyStore;
use wager_core::services::SequenceRandom;
use wager_core::{create_app, AppState};

/// Draw that makes a bet win.
pub const WIN: f64 = 0.1;
/// Draw that makes a bet lose.
pub const LOSE: f64 = 0.9;

pub struct TestApp {
    pub router: Router,
    pub store: MemoryLedgerStore,
}

/// App over an in-memory ledger. Bets follow `draws`; account ids come out
/// as USER-1, USER-2, ...
pub fn setup_test_app(draws: Vec<f64>) -> TestApp {
    build_test_app(draws, false)
}

/// Same as `setup_test_app`, with sanitized request body logging on.
pub fn setup_logging_test_app(draws: Vec<f64>) -> TestApp {
    build_test_app(draws, true)
}

fn build_test_app(draws: Vec<f64>, log_request_body: bool) -> TestApp {
    let store = MemoryLedgerStore::new();
    let random = SequenceRandom::new()
        .with_units(draws)
        .with_integers(1..10_000u64);
    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(random),
        Arc::new(MemoryIdempotencyStore::new()),
    )
    .with_request_body_logging(log_request_body);

    TestApp {
        router: create_app(state),
        store,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(post_request(uri, body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn register(&self, name: &str, contact: &str) -> String {
        let (status, body) = self
            .post(
                "/api/register",
                json!({ "display_name": name, "contact_number": contact }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["account"]["account_id"].as_str().unwrap().to_string()
    }

    pub async fn deposit(&self, account_id: &str, amount: i64) -> (StatusCode, Value) {
        self.post(
            "/api/deposit",
            json!({ "account_id": account_id, "amount": amount }),
        )
        .await
    }

    pub async fn withdraw(&self, account_id: &str, amount: i64) -> (StatusCode, Value) {
        self.post(
            "/api/withdraw",
            json!({ "account_id": account_id, "amount": amount }),
        )
        .await
    }

    pub async fn bet(&self, account_id: &str, game: &str, bet_amount: i64) -> (StatusCode, Value) {
        self.post(
            "/api/bet",
            json!({ "account_id": account_id, "game_label": game, "bet_amount": bet_amount }),
        )
        .await
    }

    pub async fn balance(&self, account_id: &str) -> i64 {
        let (status, body) = self.get(&format!("/api/accounts/{}", account_id)).await;
        assert_eq!(status, StatusCode::OK);
        body["balance"].as_i64().unwrap()
    }
}

pub fn post_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
