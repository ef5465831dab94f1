//! In-process implementation of LedgerStore.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{Account, Transaction, Wager};
use crate::ports::{
    AuditRecord, BalanceChange, LedgerStore, StoreError, StoreResult, UniqueField,
};

#[derive(Default)]
struct Ledger {
    accounts: HashMap<String, Account>,
    transactions: Vec<Transaction>,
    wagers: Vec<Wager>,
}

/// Ledger kept in memory behind a single lock. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    inner: Arc<RwLock<Ledger>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T>(items: impl DoubleEndedIterator<Item = T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .rev()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn insert_account(&self, account: &Account) -> StoreResult<()> {
        let mut ledger = self.inner.write().await;
        if ledger.accounts.contains_key(&account.account_id) {
            return Err(StoreError::UniqueViolation(UniqueField::AccountId));
        }
        if ledger
            .accounts
            .values()
            .any(|a| a.contact_number == account.contact_number)
        {
            return Err(StoreError::UniqueViolation(UniqueField::ContactNumber));
        }
        ledger
            .accounts
            .insert(account.account_id.clone(), account.clone());
        Ok(())
    }

    async fn account_exists(&self, account_id: &str) -> StoreResult<bool> {
        Ok(self.inner.read().await.accounts.contains_key(account_id))
    }

    async fn find_account(&self, account_id: &str) -> StoreResult<Option<Account>> {
        Ok(self.inner.read().await.accounts.get(account_id).cloned())
    }

    async fn find_by_contact(&self, contact_number: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .inner
            .read()
            .await
            .accounts
            .values()
            .find(|a| a.contact_number == contact_number)
            .cloned())
    }

    async fn commit(&self, change: BalanceChange) -> StoreResult<bool> {
        let mut ledger = self.inner.write().await;
        let Some(account) = ledger.accounts.get_mut(&change.account_id) else {
            return Ok(false);
        };
        if account.version != change.expected_version {
            return Ok(false);
        }

        account.balance = change.new_balance;
        account.version += 1;
        account.updated_at = Utc::now();

        match change.record {
            AuditRecord::Transaction(tx) => ledger.transactions.push(tx),
            AuditRecord::Wager(wager) => ledger.wagers.push(wager),
        }
        Ok(true)
    }

    async fn list_transactions(
        &self,
        account_id: &str,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Transaction>> {
        let ledger = self.inner.read().await;
        Ok(page(
            ledger
                .transactions
                .iter()
                .filter(|t| t.account_id == account_id)
                .cloned(),
            limit,
            offset,
        ))
    }

    async fn list_wagers(&self, account_id: &str, limit: i64, offset: i64) -> StoreResult<Vec<Wager>> {
        let ledger = self.inner.read().await;
        Ok(page(
            ledger
                .wagers
                .iter()
                .filter(|w| w.account_id == account_id)
                .cloned(),
            limit,
            offset,
        ))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Outcome, TransactionKind};

    fn account(id: &str, contact: &str) -> Account {
        Account::new(id.to_string(), "Player".to_string(), contact.to_string())
    }

    fn deposit_change(id: &str, expected_version: i64, new_balance: i64) -> BalanceChange {
        BalanceChange {
            account_id: id.to_string(),
            expected_version,
            new_balance,
            record: AuditRecord::Transaction(Transaction::approved(
                id.to_string(),
                TransactionKind::Deposit,
                new_balance,
                new_balance,
            )),
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_contact_and_id() {
        let store = MemoryLedgerStore::new();
        store.insert_account(&account("USER-1", "5550001")).await.unwrap();

        let err = store.insert_account(&account("USER-2", "5550001")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(UniqueField::ContactNumber)));

        let err = store.insert_account(&account("USER-1", "5550002")).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(UniqueField::AccountId)));
    }

    #[tokio::test]
    async fn test_commit_bumps_version_and_records() {
        let store = MemoryLedgerStore::new();
        store.insert_account(&account("USER-1", "5550001")).await.unwrap();

        assert!(store.commit(deposit_change("USER-1", 0, 500)).await.unwrap());

        let stored = store.find_account("USER-1").await.unwrap().unwrap();
        assert_eq!(stored.balance, 500);
        assert_eq!(stored.version, 1);
        assert_eq!(store.list_transactions("USER-1", 10, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_commit_leaves_no_trace() {
        let store = MemoryLedgerStore::new();
        store.insert_account(&account("USER-1", "5550001")).await.unwrap();
        assert!(store.commit(deposit_change("USER-1", 0, 500)).await.unwrap());

        assert!(!store.commit(deposit_change("USER-1", 0, 900)).await.unwrap());

        let stored = store.find_account("USER-1").await.unwrap().unwrap();
        assert_eq!(stored.balance, 500);
        assert_eq!(store.list_transactions("USER-1", 10, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lists_are_newest_first_and_paged() {
        let store = MemoryLedgerStore::new();
        store.insert_account(&account("USER-1", "5550001")).await.unwrap();
        for (version, bet) in [(0, 100), (1, 200), (2, 300)] {
            let change = BalanceChange {
                account_id: "USER-1".to_string(),
                expected_version: version,
                new_balance: 0,
                record: AuditRecord::Wager(Wager::new(
                    "USER-1".to_string(),
                    "dice".to_string(),
                    bet,
                    Outcome::Lose,
                    0,
                )),
            };
            assert!(store.commit(change).await.unwrap());
        }

        let first_page = store.list_wagers("USER-1", 2, 0).await.unwrap();
        assert_eq!(
            first_page.iter().map(|w| w.bet_amount).collect::<Vec<_>>(),
            vec![300, 200]
        );
        let second_page = store.list_wagers("USER-1", 2, 2).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert!(store.list_wagers("USER-2", 10, 0).await.unwrap().is_empty());
    }
}
