//! Ledger domain: accounts, audit records and the rules that bind them.
//! Nothing in here knows about HTTP or SQL.

pub mod account;
pub mod error;
pub mod policy;
pub mod transaction;
pub mod wager;

pub use account::Account;
pub use error::{LedgerError, UnknownVariant};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
pub use wager::{Outcome, Wager};
