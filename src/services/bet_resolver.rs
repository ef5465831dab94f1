use std::sync::Arc;

use super::random::RandomSource;
use crate::domain::policy::PAYOUT_MULTIPLIER;
use crate::domain::Outcome;

/// Chance that a single bet wins.
pub const WIN_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub payout: i64,
}

/// Coin-flip resolver. Holds no state between calls beyond its random source.
#[derive(Clone)]
pub struct BetResolver {
    random: Arc<dyn RandomSource>,
}

impl BetResolver {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    pub fn resolve(&self, bet_amount: i64) -> Resolution {
        if self.random.next_unit() < WIN_PROBABILITY {
            Resolution {
                outcome: Outcome::Win,
                payout: bet_amount.saturating_mul(PAYOUT_MULTIPLIER),
            }
        } else {
            Resolution {
                outcome: Outcome::Lose,
                payout: 0,
            }
        }
    }
}
