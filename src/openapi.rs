use utoipa::OpenApi;

use crate::domain::{Account, Outcome, Transaction, TransactionKind, TransactionStatus, Wager};
use crate::handlers;
use crate::health::{DependencyStatus, HealthResponse};
use crate::schemas::{
    AccountResponse, BetRequest, BetResponse, ErrorResponse, RegisterRequest, TransferRequest,
    TransferResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "wager-core", description = "Balance ledger for a wagering platform"),
    paths(
        handlers::health,
        handlers::accounts::register,
        handlers::accounts::get_account,
        handlers::accounts::list_transactions,
        handlers::accounts::list_wagers,
        handlers::operations::deposit,
        handlers::operations::withdraw,
        handlers::operations::place_bet,
    ),
    components(schemas(
        Account,
        Transaction,
        TransactionKind,
        TransactionStatus,
        Wager,
        Outcome,
        RegisterRequest,
        TransferRequest,
        BetRequest,
        AccountResponse,
        TransferResponse,
        BetResponse,
        ErrorResponse,
        HealthResponse,
        DependencyStatus,
    )),
    tags(
        (name = "Accounts", description = "Registration and audit trails"),
        (name = "Ledger", description = "Deposits, withdrawals and bets"),
        (name = "Health", description = "Dependency checks")
    )
)]
pub struct ApiDoc;
