//! Account registration and lookup.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::random::RandomSource;
use crate::domain::{Account, LedgerError};
use crate::ports::{LedgerStore, StoreError, UniqueField};

pub const ACCOUNT_ID_PREFIX: &str = "USER-";
/// Account ids are `USER-<n>` with `n` below this bound.
pub const ACCOUNT_ID_SPACE: u64 = 1_000_000;
pub const DEFAULT_ID_ATTEMPTS: u32 = 8;

#[derive(Clone)]
pub struct AccountRegistry {
    store: Arc<dyn LedgerStore>,
    random: Arc<dyn RandomSource>,
    max_id_attempts: u32,
}

impl AccountRegistry {
    pub fn new(store: Arc<dyn LedgerStore>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            store,
            random,
            max_id_attempts: DEFAULT_ID_ATTEMPTS,
        }
    }

    pub fn with_max_id_attempts(mut self, attempts: u32) -> Self {
        self.max_id_attempts = attempts.max(1);
        self
    }

    fn candidate_id(&self) -> String {
        format!(
            "{}{}",
            ACCOUNT_ID_PREFIX,
            self.random.next_below(ACCOUNT_ID_SPACE)
        )
    }

    /// Creates an account with a zero balance.
    ///
    /// The contact number must be unused. Identifiers are drawn at random and
    /// checked against the store; a draw that collides, either on the
    /// existence check or on insert, costs one attempt.
    pub async fn register(
        &self,
        display_name: &str,
        contact_number: &str,
    ) -> Result<Account, LedgerError> {
        if self.store.find_by_contact(contact_number).await?.is_some() {
            return Err(LedgerError::DuplicateContact);
        }

        for attempt in 1..=self.max_id_attempts {
            let account_id = self.candidate_id();
            if self.store.account_exists(&account_id).await? {
                debug!(account_id = %account_id, attempt, "Account id collision");
                continue;
            }

            let account = Account::new(
                account_id,
                display_name.to_string(),
                contact_number.to_string(),
            );
            match self.store.insert_account(&account).await {
                Ok(()) => {
                    info!(account_id = %account.account_id, "Account registered");
                    return Ok(account);
                }
                Err(StoreError::UniqueViolation(UniqueField::AccountId)) => {
                    debug!(account_id = %account.account_id, attempt, "Account id taken on insert");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(attempts = self.max_id_attempts, "Account id generation exhausted");
        Err(LedgerError::IdGenerationExhausted(self.max_id_attempts))
    }

    pub async fn lookup(&self, account_id: &str) -> Result<Account, LedgerError> {
        self.store
            .find_account(account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))
    }
}
