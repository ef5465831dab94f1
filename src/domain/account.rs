//! Account domain entity.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A player account holding a balance in the smallest currency unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Account {
    pub account_id: String,
    pub display_name: String,
    pub contact_number: String,
    pub balance: i64,
    /// Bumped by every committed balance change. Used as the optimistic
    /// concurrency token.
    #[serde(skip)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(account_id: String, display_name: String, contact_number: String) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            display_name,
            contact_number,
            balance: 0,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn can_cover(&self, amount: i64) -> bool {
        self.balance >= amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_starts_empty() {
        let account = Account::new("USER-1".to_string(), "Ada".to_string(), "+15550100".to_string());
        assert_eq!(account.balance, 0);
        assert_eq!(account.version, 0);
        assert_eq!(account.created_at, account.updated_at);
    }

    #[test]
    fn test_version_is_not_serialized() {
        let account = Account::new("USER-1".to_string(), "Ada".to_string(), "+15550100".to_string());
        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("version").is_none());
        assert_eq!(json["balance"], 0);
    }
}
