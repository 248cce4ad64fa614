//! Profile Handler
//!
//! Investor profile CRUD. A user has at most one profile.

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::audit::{AuditAction, AuditLogBuilder, AuditLogService};
use crate::domain::{DomainError, OperationContext};
use crate::error::AppError;
use crate::store::{profiles, ProfileRecord};

use super::SetProfileCommand;

/// Handler for investor profiles
pub struct ProfileHandler {
    pool: PgPool,
    audit: AuditLogService,
}

impl ProfileHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            audit: AuditLogService::new(pool.clone()),
            pool,
        }
    }

    /// The user's current profile
    pub async fn get(&self, user_id: Uuid) -> Result<ProfileRecord, AppError> {
        profiles::find_by_user(&self.pool, user_id)
            .await?
            .ok_or_else(|| DomainError::ProfileNotFound.into())
    }

    /// Create a profile; fails when one already exists
    pub async fn create(
        &self,
        command: SetProfileCommand,
        context: &OperationContext,
    ) -> Result<ProfileRecord, AppError> {
        let profile = command.parsed_profile()?;

        let record = profiles::insert(&self.pool, command.user_id, profile)
            .await?
            .ok_or(DomainError::ProfileAlreadyExists)?;

        tracing::info!(user_id = %command.user_id, profile = %profile, "Profile created");
        self.audit_change(AuditAction::ProfileCreated, &record, context).await;

        Ok(record)
    }

    /// Replace an existing profile
    pub async fn update(
        &self,
        command: SetProfileCommand,
        context: &OperationContext,
    ) -> Result<ProfileRecord, AppError> {
        let profile = command.parsed_profile()?;

        let record = profiles::update(&self.pool, command.user_id, profile)
            .await?
            .ok_or(DomainError::ProfileNotFound)?;

        tracing::info!(user_id = %command.user_id, profile = %profile, "Profile updated");
        self.audit_change(AuditAction::ProfileUpdated, &record, context).await;

        Ok(record)
    }

    /// Remove the user's profile
    pub async fn delete(&self, user_id: Uuid, context: &OperationContext) -> Result<(), AppError> {
        let record = self.get(user_id).await?;

        if !profiles::delete(&self.pool, user_id).await? {
            return Err(DomainError::ProfileNotFound.into());
        }

        tracing::info!(user_id = %user_id, "Profile deleted");
        self.audit_change(AuditAction::ProfileDeleted, &record, context).await;

        Ok(())
    }

    async fn audit_change(&self, action: AuditAction, record: &ProfileRecord, context: &OperationContext) {
        self.audit
            .record(
                AuditLogBuilder::new(action)
                    .resource_type("UserProfile")
                    .resource_id(record.id)
                    .details(&json!({ "profile": record.profile })),
                context,
            )
            .await;
    }
}
