//! Postgres implementation of LedgerStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Account, Transaction, UnknownVariant, Wager};
use crate::ports::{AuditRecord, BalanceChange, LedgerStore, StoreError, StoreResult};

/// Postgres-backed ledger store.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn insert_account(&self, account: &Account) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id, display_name, contact_number, balance, version, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&account.account_id)
        .bind(&account.display_name)
        .bind(&account.contact_number)
        .bind(account.balance)
        .bind(account.version)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn account_exists(&self, account_id: &str) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE account_id = $1)")
                .bind(account_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn find_account(&self, account_id: &str) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(AccountRow::into_domain))
    }

    async fn find_by_contact(&self, contact_number: &str) -> StoreResult<Option<Account>> {
        let row =
            sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE contact_number = $1")
                .bind(contact_number)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(AccountRow::into_domain))
    }

    async fn commit(&self, change: BalanceChange) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = $1, version = version + 1, updated_at = NOW()
            WHERE account_id = $2 AND version = $3
            "#,
        )
        .bind(change.new_balance)
        .bind(&change.account_id)
        .bind(change.expected_version)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        match &change.record {
            AuditRecord::Transaction(record) => {
                sqlx::query(
                    r#"
                    INSERT INTO transactions (
                        id, account_id, kind, requested_amount, net_amount, status, created_at
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(record.id)
                .bind(&record.account_id)
                .bind(record.kind.as_str())
                .bind(record.requested_amount)
                .bind(record.net_amount)
                .bind(record.status.as_str())
                .bind(record.created_at)
                .execute(&mut *tx)
                .await?;
            }
            AuditRecord::Wager(record) => {
                sqlx::query(
                    r#"
                    INSERT INTO wagers (
                        id, account_id, game_label, bet_amount, outcome, payout, created_at
                    ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(record.id)
                .bind(&record.account_id)
                .bind(&record.game_label)
                .bind(record.bet_amount)
                .bind(record.outcome.as_str())
                .bind(record.payout)
                .bind(record.created_at)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn list_transactions(
        &self,
        account_id: &str,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT * FROM transactions
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    async fn list_wagers(&self, account_id: &str, limit: i64, offset: i64) -> StoreResult<Vec<Wager>> {
        let rows = sqlx::query_as::<_, WagerRow>(
            r#"
            SELECT * FROM wagers
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WagerRow::into_domain).collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn corrupt(e: UnknownVariant) -> StoreError {
    StoreError::Unavailable(format!("corrupt ledger row: {}", e))
}

// Internal row types for SQLx. Not exposed outside the adapter.

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    account_id: String,
    display_name: String,
    contact_number: String,
    balance: i64,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_domain(self) -> Account {
        Account {
            account_id: self.account_id,
            display_name: self.display_name,
            contact_number: self.contact_number,
            balance: self.balance,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    account_id: String,
    kind: String,
    requested_amount: i64,
    net_amount: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> StoreResult<Transaction> {
        Ok(Transaction {
            id: self.id,
            account_id: self.account_id,
            kind: self.kind.parse().map_err(corrupt)?,
            requested_amount: self.requested_amount,
            net_amount: self.net_amount,
            status: self.status.parse().map_err(corrupt)?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WagerRow {
    id: Uuid,
    account_id: String,
    game_label: String,
    bet_amount: i64,
    outcome: String,
    payout: i64,
    created_at: DateTime<Utc>,
}

impl WagerRow {
    fn into_domain(self) -> StoreResult<Wager> {
        Ok(Wager {
            id: self.id,
            account_id: self.account_id,
            game_label: self.game_label,
            bet_amount: self.bet_amount,
            outcome: self.outcome.parse().map_err(corrupt)?,
            payout: self.payout,
            created_at: self.created_at,
        })
    }
}
