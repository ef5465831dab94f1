use thiserror::Error;

/// Every way a ledger operation can fail.
///
/// The first group are business-rule rejections and are reported to the
/// caller as a normal failure result. The second group are infrastructure
/// failures and must never be confused with a rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("An account with this contact number already exists")]
    DuplicateContact,

    #[error("Account {0} not found")]
    AccountNotFound(String),

    #[error("Minimum withdrawal is {0}")]
    BelowMinimum(i64),

    #[error("Amount must be a multiple of {0}")]
    InvalidIncrement(i64),

    #[error("Bet amount must be a positive multiple of {0}")]
    InvalidBetAmount(i64),

    #[error("Insufficient balance")]
    InsufficientFunds,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Ledger store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Could not generate a unique account id after {0} attempts")]
    IdGenerationExhausted(u32),

    #[error("Account {0} is under heavy concurrent modification, try again")]
    Contention(String),
}

impl LedgerError {
    pub fn is_business(&self) -> bool {
        !matches!(
            self,
            LedgerError::StoreUnavailable(_)
                | LedgerError::IdGenerationExhausted(_)
                | LedgerError::Contention(_)
        )
    }

    /// Stable machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            LedgerError::DuplicateContact => "DuplicateContact",
            LedgerError::AccountNotFound(_) => "AccountNotFound",
            LedgerError::BelowMinimum(_) => "BelowMinimum",
            LedgerError::InvalidIncrement(_) => "InvalidIncrement",
            LedgerError::InvalidBetAmount(_) => "InvalidBetAmount",
            LedgerError::InsufficientFunds => "InsufficientFunds",
            LedgerError::InvalidAmount(_) => "InvalidAmount",
            LedgerError::StoreUnavailable(_) => "StoreUnavailable",
            LedgerError::IdGenerationExhausted(_) => "IdGenerationExhausted",
            LedgerError::Contention(_) => "Contention",
        }
    }
}

/// A persisted label that does not map to any known enum variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_are_separated_from_infrastructure() {
        assert!(LedgerError::InsufficientFunds.is_business());
        assert!(LedgerError::DuplicateContact.is_business());
        assert!(!LedgerError::StoreUnavailable("down".to_string()).is_business());
        assert!(!LedgerError::Contention("USER-1".to_string()).is_business());
        assert!(!LedgerError::IdGenerationExhausted(8).is_business());
    }

    #[test]
    fn test_messages_name_the_rule() {
        assert_eq!(LedgerError::BelowMinimum(1000).to_string(), "Minimum withdrawal is 1000");
        assert_eq!(LedgerError::InvalidIncrement(100).reason(), "InvalidIncrement");
    }
}
