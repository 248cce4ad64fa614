//! Request context
//!
//! Who asked for an operation and which request carried it. Handlers copy
//! these fields into every audit entry they write.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;

/// Caller and request metadata passed to every handler.
///
/// Built by the API middleware: the user comes from the verified bearer
/// token (absent on register and login), the correlation id from the
/// `x-request-id` header and the IP from `X-Forwarded-For`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationContext {
    /// Subject of the access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_user_id: Option<Uuid>,

    /// Request id echoed back in `x-request-id`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
}

impl OperationContext {
    /// Empty context, for callers outside an HTTP request
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for one HTTP request. A missing or unparsable request id is
    /// replaced by a fresh one so audit rows are always correlated.
    pub fn for_request(correlation_id: Option<Uuid>, client_ip: Option<IpAddr>) -> Self {
        Self {
            request_user_id: None,
            correlation_id: Some(correlation_id.unwrap_or_else(Uuid::new_v4)),
            client_ip,
        }
    }

    /// Attach the authenticated user
    pub fn with_request_user(mut self, user_id: Uuid) -> Self {
        self.request_user_id = Some(user_id);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}
