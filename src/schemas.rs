//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Account, Outcome};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub display_name: String,
    pub contact_number: String,
}

/// Body of `/api/deposit` and `/api/withdraw`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct TransferRequest {
    pub account_id: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct BetRequest {
    pub account_id: String,
    pub game_label: String,
    pub bet_amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub success: bool,
    pub message: String,
    pub account: Account,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferResponse {
    pub success: bool,
    pub message: String,
    pub net_amount: i64,
    pub balance: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BetResponse {
    pub success: bool,
    pub message: String,
    pub outcome: Outcome,
    pub payout: i64,
    pub balance: i64,
}

/// Every failed request answers with this envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    /// Clamps to `1..=MAX_PAGE_SIZE` and a non-negative offset.
    pub fn resolve(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}
