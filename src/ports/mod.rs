//! Storage port for the ledger.
//! Services depend on this trait only; adapters provide the backends.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Account, LedgerError, Transaction, Wager};

/// Account columns guarded by a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    AccountId,
    ContactNumber,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unique constraint violated on {0:?}")]
    UniqueViolation(UniqueField),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                let field = match db_err.constraint() {
                    Some(c) if c.contains("contact_number") => UniqueField::ContactNumber,
                    _ => UniqueField::AccountId,
                };
                return StoreError::UniqueViolation(field);
            }
        }
        StoreError::Unavailable(e.to_string())
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(UniqueField::ContactNumber) => LedgerError::DuplicateContact,
            other => LedgerError::StoreUnavailable(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The audit record written together with a balance change.
#[derive(Debug, Clone)]
pub enum AuditRecord {
    Transaction(Transaction),
    Wager(Wager),
}

/// A conditional balance update: applied only while the account still
/// carries `expected_version`.
#[derive(Debug, Clone)]
pub struct BalanceChange {
    pub account_id: String,
    pub expected_version: i64,
    pub new_balance: i64,
    pub record: AuditRecord,
}

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn insert_account(&self, account: &Account) -> StoreResult<()>;

    async fn account_exists(&self, account_id: &str) -> StoreResult<bool>;

    async fn find_account(&self, account_id: &str) -> StoreResult<Option<Account>>;

    async fn find_by_contact(&self, contact_number: &str) -> StoreResult<Option<Account>>;

    /// Applies the balance change and appends its audit record atomically.
    /// Returns `false`, with nothing written, when the version no longer
    /// matches.
    async fn commit(&self, change: BalanceChange) -> StoreResult<bool>;

    async fn list_transactions(
        &self,
        account_id: &str,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Transaction>>;

    async fn list_wagers(&self, account_id: &str, limit: i64, offset: i64) -> StoreResult<Vec<Wager>>;

    async fn ping(&self) -> StoreResult<()>;
}

impl From<Transaction> for AuditRecord {
    fn from(tx: Transaction) -> Self {
        AuditRecord::Transaction(tx)
    }
}

impl From<Wager> for AuditRecord {
    fn from(wager: Wager) -> Self {
        AuditRecord::Wager(wager)
    }
}
