//! Persistence module
//!
//! Plain SQL per table. Every function takes any Postgres executor, so the
//! same call runs against the pool or inside a handler's transaction.

pub mod coins;
pub mod profiles;
pub mod transactions;
pub mod users;
pub mod wallets;

pub use coins::Coin;
pub use profiles::ProfileRecord;
pub use transactions::{NewTransaction, TransactionRecord, TransactionView};
pub use users::{UserRecord, UserSummary};
pub use wallets::{Wallet, WalletView};
