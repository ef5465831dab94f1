//! Wager domain entity. Append-only audit record for bets.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Lose => "lose",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(Outcome::Win),
            "lose" => Ok(Outcome::Lose),
            other => Err(UnknownVariant::new("outcome", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Wager {
    pub id: Uuid,
    pub account_id: String,
    pub game_label: String,
    pub bet_amount: i64,
    pub outcome: Outcome,
    pub payout: i64,
    pub created_at: DateTime<Utc>,
}

impl Wager {
    pub fn new(
        account_id: String,
        game_label: String,
        bet_amount: i64,
        outcome: Outcome,
        payout: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            game_label,
            bet_amount,
            outcome,
            payout,
            created_at: Utc::now(),
        }
    }
}
