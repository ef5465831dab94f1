use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::domain::LedgerError;
use crate::error::AppError;
use crate::schemas::{AccountResponse, ErrorResponse, Pagination, RegisterRequest};
use crate::validation::{validate_account_id, validate_contact_number, validate_display_name};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Malformed or invalid request", body = ErrorResponse),
        (status = 409, description = "Contact number already registered", body = ErrorResponse),
        (status = 503, description = "Ledger store unavailable", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let display_name = validate_display_name(&payload.display_name)?;
    let contact_number = validate_contact_number(&payload.contact_number)?;

    let account = state
        .registry
        .register(&display_name, &contact_number)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse {
            success: true,
            message: "Account registered".to_string(),
            account,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/accounts/{account_id}",
    params(("account_id" = String, Path, description = "Account identifier")),
    responses(
        (status = 200, description = "Account found", body = crate::domain::Account),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let account_id = validate_account_id(&account_id)?;
    let account = state.registry.lookup(&account_id).await?;
    Ok(Json(account))
}

#[utoipa::path(
    get,
    path = "/api/accounts/{account_id}/transactions",
    params(("account_id" = String, Path, description = "Account identifier"), Pagination),
    responses(
        (status = 200, description = "Deposits and withdrawals, newest first", body = [crate::domain::Transaction]),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(pagination) = pagination?;
    let account_id = validate_account_id(&account_id)?;
    let (limit, offset) = pagination.resolve();

    state.registry.lookup(&account_id).await?;
    let transactions = state
        .store
        .list_transactions(&account_id, limit, offset)
        .await
        .map_err(LedgerError::from)?;

    Ok(Json(transactions))
}

#[utoipa::path(
    get,
    path = "/api/accounts/{account_id}/wagers",
    params(("account_id" = String, Path, description = "Account identifier"), Pagination),
    responses(
        (status = 200, description = "Bets, newest first", body = [crate::domain::Wager]),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
pub async fn list_wagers(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(pagination) = pagination?;
    let account_id = validate_account_id(&account_id)?;
    let (limit, offset) = pagination.resolve();

    state.registry.lookup(&account_id).await?;
    let wagers = state
        .store
        .list_wagers(&account_id, limit, offset)
        .await
        .map_err(LedgerError::from)?;

    Ok(Json(wagers))
}
