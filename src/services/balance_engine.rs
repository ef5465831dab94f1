//! Deposits, withdrawals and bets against a single account.
//!
//! Every operation runs `validate -> apply -> record` as one optimistic
//! unit: the account is read with its version, the rules are checked
//! against that snapshot, and the new balance is committed together with
//! its audit record only if nobody else committed in between. A lost race
//! re-reads and re-validates, so two debits that each fit a stale balance
//! can never both land.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::bet_resolver::{BetResolver, Resolution};
use crate::domain::policy::{
    self, BET_INCREMENT, MIN_WITHDRAWAL, WITHDRAWAL_INCREMENT,
};
use crate::domain::{Account, LedgerError, Outcome, Transaction, TransactionKind, Wager};
use crate::ports::{AuditRecord, BalanceChange, LedgerStore};

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 16;

/// Result of a committed deposit or withdrawal.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub net_amount: i64,
    pub new_balance: i64,
    pub transaction: Transaction,
}

/// Result of a committed bet.
#[derive(Debug, Clone)]
pub struct BetReceipt {
    pub outcome: Outcome,
    pub payout: i64,
    pub new_balance: i64,
    pub wager: Wager,
}

#[derive(Clone)]
pub struct BalanceEngine {
    store: Arc<dyn LedgerStore>,
    resolver: BetResolver,
    max_attempts: u32,
}

impl BalanceEngine {
    pub fn new(store: Arc<dyn LedgerStore>, resolver: BetResolver) -> Self {
        Self {
            store,
            resolver,
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Read-validate-commit loop shared by all operations. `plan` sees a
    /// fresh snapshot on every attempt and returns the new balance plus the
    /// audit record to write with it.
    async fn apply<R, F>(&self, account_id: &str, mut plan: F) -> Result<(i64, R), LedgerError>
    where
        R: Clone + Into<AuditRecord>,
        F: FnMut(&Account) -> Result<(i64, R), LedgerError>,
    {
        for attempt in 1..=self.max_attempts {
            let account = self
                .store
                .find_account(account_id)
                .await?
                .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))?;

            let (new_balance, record) = plan(&account)?;
            if new_balance < 0 {
                return Err(LedgerError::InsufficientFunds);
            }

            let change = BalanceChange {
                account_id: account.account_id.clone(),
                expected_version: account.version,
                new_balance,
                record: record.clone().into(),
            };
            if self.store.commit(change).await? {
                return Ok((new_balance, record));
            }

            debug!(account_id = %account_id, attempt, "Balance changed concurrently, retrying");
        }

        warn!(account_id = %account_id, attempts = self.max_attempts, "Gave up on contended account");
        Err(LedgerError::Contention(account_id.to_string()))
    }

    pub async fn deposit(&self, account_id: &str, amount: i64) -> Result<TransferReceipt, LedgerError> {
        if amount <= 0 {
            return Err(LedgerError::InvalidAmount(
                "deposit amount must be positive".to_string(),
            ));
        }
        let net_amount = policy::net_of_fee(amount);

        let (new_balance, transaction) = self
            .apply(account_id, |account| {
                let new_balance = credit(account.balance, net_amount)?;
                let tx = Transaction::approved(
                    account.account_id.clone(),
                    TransactionKind::Deposit,
                    amount,
                    net_amount,
                );
                Ok((new_balance, tx))
            })
            .await?;

        info!(account_id = %account_id, amount, net_amount, new_balance, "Deposit applied");
        Ok(TransferReceipt {
            net_amount,
            new_balance,
            transaction,
        })
    }

    /// Debits the full requested amount. The fee only reduces the reported
    /// `net_amount`.
    pub async fn withdraw(&self, account_id: &str, amount: i64) -> Result<TransferReceipt, LedgerError> {
        let net_amount = policy::net_of_fee(amount);

        let (new_balance, transaction) = self
            .apply(account_id, |account| {
                if amount < MIN_WITHDRAWAL {
                    return Err(LedgerError::BelowMinimum(MIN_WITHDRAWAL));
                }
                if amount % WITHDRAWAL_INCREMENT != 0 {
                    return Err(LedgerError::InvalidIncrement(WITHDRAWAL_INCREMENT));
                }
                if !account.can_cover(amount) {
                    return Err(LedgerError::InsufficientFunds);
                }
                let tx = Transaction::approved(
                    account.account_id.clone(),
                    TransactionKind::Withdrawal,
                    amount,
                    net_amount,
                );
                Ok((account.balance - amount, tx))
            })
            .await?;

        info!(account_id = %account_id, amount, net_amount, new_balance, "Withdrawal applied");
        Ok(TransferReceipt {
            net_amount,
            new_balance,
            transaction,
        })
    }

    /// The outcome is drawn at most once per call and reused if the commit
    /// has to be retried.
    pub async fn place_bet(
        &self,
        account_id: &str,
        game_label: &str,
        bet_amount: i64,
    ) -> Result<BetReceipt, LedgerError> {
        let mut drawn: Option<Resolution> = None;

        let (new_balance, wager) = self
            .apply(account_id, |account| {
                if !policy::is_valid_bet(bet_amount) {
                    return Err(LedgerError::InvalidBetAmount(BET_INCREMENT));
                }
                if !account.can_cover(bet_amount) {
                    return Err(LedgerError::InsufficientFunds);
                }

                let resolution = *drawn.get_or_insert_with(|| self.resolver.resolve(bet_amount));
                let new_balance = match resolution.outcome {
                    Outcome::Win => credit(account.balance, resolution.payout)?,
                    Outcome::Lose => account.balance - bet_amount,
                };
                let wager = Wager::new(
                    account.account_id.clone(),
                    game_label.to_string(),
                    bet_amount,
                    resolution.outcome,
                    resolution.payout,
                );
                Ok((new_balance, wager))
            })
            .await?;

        info!(
            account_id = %account_id,
            game = %game_label,
            bet_amount,
            outcome = %wager.outcome,
            payout = wager.payout,
            new_balance,
            "Bet settled"
        );
        Ok(BetReceipt {
            outcome: wager.outcome,
            payout: wager.payout,
            new_balance,
            wager,
        })
    }
}

fn credit(balance: i64, amount: i64) -> Result<i64, LedgerError> {
    balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::InvalidAmount("balance would overflow".to_string()))
}
