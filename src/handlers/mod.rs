//! Command Handlers module
//!
//! Handlers that orchestrate business operations. Each handler owns its
//! database transaction and records an audit entry once it commits.

mod auth_handler;
mod commands;
mod convert_handler;
mod profile_handler;
mod transfer_handler;

#[cfg(test)]
mod tests;

pub use auth_handler::{LoginHandler, RegisterHandler, INITIAL_OPCOIN_BALANCE};
pub use commands::*;
pub use convert_handler::ConvertHandler;
pub use profile_handler::ProfileHandler;
pub use transfer_handler::TransferHandler;
