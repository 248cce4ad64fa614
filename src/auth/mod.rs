//! Authentication primitives
//!
//! Password hashing and access tokens. The HTTP side lives in
//! `api::middleware`.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError};
pub use token::{Claims, TokenError, TokenService};
