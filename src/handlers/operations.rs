use axum::{extract::rejection::JsonRejection, extract::State, response::IntoResponse, Json};

use crate::error::AppError;
use crate::schemas::{BetRequest, BetResponse, ErrorResponse, TransferRequest, TransferResponse};
use crate::validation::{validate_account_id, validate_game_label};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/deposit",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Deposit applied", body = TransferResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Amount rejected", body = ErrorResponse),
        (status = 503, description = "Ledger store unavailable", body = ErrorResponse)
    ),
    tag = "Ledger"
)]
pub async fn deposit(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let account_id = validate_account_id(&payload.account_id)?;

    let receipt = state.engine.deposit(&account_id, payload.amount).await?;

    Ok(Json(TransferResponse {
        success: true,
        message: format!("Deposited {}", receipt.net_amount),
        net_amount: receipt.net_amount,
        balance: receipt.new_balance,
    }))
}

#[utoipa::path(
    post,
    path = "/api/withdraw",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Withdrawal applied", body = TransferResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Below minimum, bad increment or insufficient funds", body = ErrorResponse),
        (status = 503, description = "Ledger store unavailable", body = ErrorResponse)
    ),
    tag = "Ledger"
)]
pub async fn withdraw(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let account_id = validate_account_id(&payload.account_id)?;

    let receipt = state.engine.withdraw(&account_id, payload.amount).await?;

    Ok(Json(TransferResponse {
        success: true,
        message: format!("Withdrawn {}", receipt.net_amount),
        net_amount: receipt.net_amount,
        balance: receipt.new_balance,
    }))
}

#[utoipa::path(
    post,
    path = "/api/bet",
    request_body = BetRequest,
    responses(
        (status = 200, description = "Bet settled", body = BetResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Invalid bet amount or insufficient funds", body = ErrorResponse),
        (status = 503, description = "Ledger store unavailable", body = ErrorResponse)
    ),
    tag = "Ledger"
)]
pub async fn place_bet(
    State(state): State<AppState>,
    payload: Result<Json<BetRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let account_id = validate_account_id(&payload.account_id)?;
    let game_label = validate_game_label(&payload.game_label)?;

    let receipt = state
        .engine
        .place_bet(&account_id, &game_label, payload.bet_amount)
        .await?;

    Ok(Json(BetResponse {
        success: true,
        message: format!("Bet placed on {}", game_label),
        outcome: receipt.outcome,
        payout: receipt.payout,
        balance: receipt.new_balance,
    }))
}
