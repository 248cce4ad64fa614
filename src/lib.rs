//! bankop Library
//!
//! Wallet backend: registration, OPCOIN → BRL conversion, peer-to-peer
//! transfers and investor profiles. Re-exports modules for the server
//! binary and integration tests.

pub mod api;
pub mod audit;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod state;
pub mod store;

mod error;

pub use config::Config;
pub use domain::{Amount, AmountError, Balance, DomainError, OperationContext};
pub use error::{AppError, ErrorResponse};
pub use state::AppState;
