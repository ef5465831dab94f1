pub mod account_registry;
pub mod balance_engine;
pub mod bet_resolver;
pub mod random;

pub use account_registry::AccountRegistry;
pub use balance_engine::{BalanceEngine, BetReceipt, TransferReceipt};
pub use bet_resolver::{BetResolver, Resolution};
pub use random::{RandomSource, SequenceRandom, ThreadRandom};
