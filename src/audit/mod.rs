//! Audit Log Service
//!
//! Tamper-evident audit trail with hash chain verification. Registration,
//! logins, conversions, transfers and profile changes are recorded here in
//! addition to the ledger itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::OperationContext;

/// Hash that precedes the first entry of the chain
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Advisory lock key serializing appends to the chain
const AUDIT_CHAIN_LOCK_KEY: i64 = 0x6261_6e6b_6f70_01;

/// Audit log entry as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub sequence_number: i64,
    pub request_user_id: Option<Uuid>,
    pub correlation_id: Option<Uuid>,
    pub action: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<Uuid>,
    pub details: Option<String>,
    pub previous_hash: String,
    pub current_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Audit action types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UserRegistered,
    LoginSucceeded,
    LoginFailed,
    CoinsConverted,
    TransferExecuted,
    ProfileCreated,
    ProfileUpdated,
    ProfileDeleted,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserRegistered => "user.registered",
            AuditAction::LoginSucceeded => "auth.login_succeeded",
            AuditAction::LoginFailed => "auth.login_failed",
            AuditAction::CoinsConverted => "wallet.converted",
            AuditAction::TransferExecuted => "wallet.transferred",
            AuditAction::ProfileCreated => "profile.created",
            AuditAction::ProfileUpdated => "profile.updated",
            AuditAction::ProfileDeleted => "profile.deleted",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builder for creating audit log entries
#[derive(Debug, Clone)]
pub struct AuditLogBuilder {
    action: AuditAction,
    resource_type: Option<String>,
    resource_id: Option<Uuid>,
    details: Option<String>,
}

impl AuditLogBuilder {
    /// Create a new audit log builder
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            resource_type: None,
            resource_id: None,
            details: None,
        }
    }

    /// Set the resource type
    pub fn resource_type(mut self, resource_type: &str) -> Self {
        self.resource_type = Some(resource_type.to_string());
        self
    }

    /// Set the resource ID
    pub fn resource_id(mut self, resource_id: Uuid) -> Self {
        self.resource_id = Some(resource_id);
        self
    }

    /// Attach structured details, stored as JSON text
    pub fn details<T: Serialize>(mut self, details: &T) -> Self {
        self.details = serde_json::to_string(details).ok();
        self
    }
}

/// Fields covered by an entry's hash
struct ChainLink<'a> {
    id: Uuid,
    sequence_number: i64,
    action: &'a str,
    request_user_id: Option<Uuid>,
    resource_id: Option<Uuid>,
    details: Option<&'a str>,
    previous_hash: &'a str,
}

impl ChainLink<'_> {
    fn hash(&self) -> String {
        let input = format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.id,
            self.sequence_number,
            self.action,
            self.request_user_id.map(|u| u.to_string()).unwrap_or_default(),
            self.resource_id.map(|u| u.to_string()).unwrap_or_default(),
            self.details.unwrap_or_default(),
            self.previous_hash
        );
        sha256_hex(&input)
    }
}

impl<'a> From<&'a AuditLogEntry> for ChainLink<'a> {
    fn from(entry: &'a AuditLogEntry) -> Self {
        Self {
            id: entry.id,
            sequence_number: entry.sequence_number,
            action: &entry.action,
            request_user_id: entry.request_user_id,
            resource_id: entry.resource_id,
            details: entry.details.as_deref(),
            previous_hash: &entry.previous_hash,
        }
    }
}

/// Audit Log Service
#[derive(Debug, Clone)]
pub struct AuditLogService {
    pool: PgPool,
}

impl AuditLogService {
    /// Create a new AuditLogService
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry to the chain
    pub async fn log(
        &self,
        builder: AuditLogBuilder,
        context: &OperationContext,
    ) -> Result<Uuid, AuditLogError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(AUDIT_CHAIN_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let tail: Option<(i64, String)> = sqlx::query_as(
            "SELECT sequence_number, current_hash FROM audit_logs ORDER BY sequence_number DESC LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?;

        let (sequence_number, previous_hash) = match tail {
            Some((seq, hash)) => (seq + 1, hash),
            None => (1, GENESIS_HASH.to_string()),
        };

        let id = Uuid::new_v4();
        let action = builder.action.as_str();
        let current_hash = ChainLink {
            id,
            sequence_number,
            action,
            request_user_id: context.request_user_id,
            resource_id: builder.resource_id,
            details: builder.details.as_deref(),
            previous_hash: &previous_hash,
        }
        .hash();

        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id, sequence_number, request_user_id, correlation_id,
                action, resource_type, resource_id, details,
                previous_hash, current_hash, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            "#,
        )
        .bind(id)
        .bind(sequence_number)
        .bind(context.request_user_id)
        .bind(context.correlation_id)
        .bind(action)
        .bind(&builder.resource_type)
        .bind(builder.resource_id)
        .bind(&builder.details)
        .bind(&previous_hash)
        .bind(&current_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            audit_id = %id,
            sequence_number,
            action,
            "Audit log entry created"
        );

        Ok(id)
    }

    /// Append an entry, logging instead of failing.
    ///
    /// Used after a business transaction has already committed.
    pub async fn record(&self, builder: AuditLogBuilder, context: &OperationContext) {
        let action = builder.action;
        if let Err(e) = self.log(builder, context).await {
            tracing::warn!(action = %action, error = %e, "Failed to write audit log entry");
        }
    }

    /// Verify the integrity of the hash chain from its start
    pub async fn verify_hash_chain(
        &self,
        limit: Option<i64>,
    ) -> Result<ChainVerificationResult, AuditLogError> {
        let limit = limit.unwrap_or(1000);

        let entries: Vec<AuditLogEntry> = sqlx::query_as(
            r#"
            SELECT id, sequence_number, request_user_id, correlation_id,
                   action, resource_type, resource_id, details,
                   previous_hash, current_hash, created_at
            FROM audit_logs
            ORDER BY sequence_number ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(verify_entries(&entries))
    }

    /// Get audit logs for a specific user, newest first
    pub async fn get_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<AuditLogEntry>, AuditLogError> {
        let entries = sqlx::query_as(
            r#"
            SELECT id, sequence_number, request_user_id, correlation_id,
                   action, resource_type, resource_id, details,
                   previous_hash, current_hash, created_at
            FROM audit_logs
            WHERE request_user_id = $1
            ORDER BY sequence_number DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

/// Walk entries in sequence order, checking linkage and recomputing hashes
fn verify_entries(entries: &[AuditLogEntry]) -> ChainVerificationResult {
    let mut previous_hash = GENESIS_HASH.to_string();

    for entry in entries {
        if entry.previous_hash != previous_hash {
            return ChainVerificationResult::invalid(entry, previous_hash, entry.previous_hash.clone());
        }

        let calculated_hash = ChainLink::from(entry).hash();
        if calculated_hash != entry.current_hash {
            return ChainVerificationResult::invalid(entry, calculated_hash, entry.current_hash.clone());
        }

        previous_hash = entry.current_hash.clone();
    }

    ChainVerificationResult {
        is_valid: true,
        entries_checked: entries.len() as u64,
        first_invalid_entry: None,
        expected_hash: None,
        actual_hash: None,
    }
}

/// Result of hash chain verification
#[derive(Debug, Clone)]
pub struct ChainVerificationResult {
    pub is_valid: bool,
    pub entries_checked: u64,
    pub first_invalid_entry: Option<Uuid>,
    pub expected_hash: Option<String>,
    pub actual_hash: Option<String>,
}

impl ChainVerificationResult {
    fn invalid(entry: &AuditLogEntry, expected: String, actual: String) -> Self {
        Self {
            is_valid: false,
            entries_checked: entry.sequence_number as u64,
            first_invalid_entry: Some(entry.id),
            expected_hash: Some(expected),
            actual_hash: Some(actual),
        }
    }
}

/// Calculate SHA-256 hash and return as hex string
fn sha256_hex(input: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Audit log errors
#[derive(Debug, thiserror::Error)]
pub enum AuditLogError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
