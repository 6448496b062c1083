//! Identity repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::{IdentityId, TenantId};
use warden_entity::identity::{Identity, IdentityRemoval, NewIdentity};
use warden_entity::membership::Membership;

use crate::store::IdentityStore;

const EMAIL_CONSTRAINT: &str = "identities_email_key";

/// PostgreSQL-backed [`IdentityStore`].
#[derive(Debug, Clone)]
pub struct IdentityRepository {
    pool: PgPool,
}

impl IdentityRepository {
    /// Create a new identity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a write error, turning the email unique constraint into a conflict.
fn map_write_error(e: sqlx::Error, email: &str, context: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.constraint() == Some(EMAIL_CONSTRAINT) => {
            AppError::already_exists(format!("Email '{email}' is already registered"))
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

#[async_trait]
impl IdentityStore for IdentityRepository {
    async fn find_by_id(&self, id: IdentityId) -> AppResult<Option<Identity>> {
        sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find identity by id", e)
            })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>> {
        sqlx::query_as::<_, Identity>("SELECT * FROM identities WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find identity by email", e)
            })
    }

    async fn create(&self, data: &NewIdentity) -> AppResult<Identity> {
        sqlx::query_as::<_, Identity>(
            "INSERT INTO identities (id, email, secret_digest, display_name) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(IdentityId::new())
        .bind(&data.email)
        .bind(&data.secret_digest)
        .bind(&data.display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &data.email, "Failed to create identity"))
    }

    async fn update_profile(
        &self,
        id: IdentityId,
        display_name: &str,
        actor: IdentityId,
    ) -> AppResult<Identity> {
        sqlx::query_as::<_, Identity>(
            "UPDATE identities SET display_name = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(display_name)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update profile", e))?
        .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))
    }

    async fn update_email(
        &self,
        id: IdentityId,
        email: &str,
        actor: IdentityId,
    ) -> AppResult<Identity> {
        sqlx::query_as::<_, Identity>(
            "UPDATE identities SET email = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(email)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, email, "Failed to update email"))?
        .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))
    }

    async fn update_secret(
        &self,
        id: IdentityId,
        secret_digest: &str,
        actor: IdentityId,
    ) -> AppResult<Identity> {
        sqlx::query_as::<_, Identity>(
            "UPDATE identities SET secret_digest = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(secret_digest)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update secret", e))?
        .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))
    }

    async fn set_last_tenant(
        &self,
        id: IdentityId,
        tenant_id: TenantId,
        actor: IdentityId,
    ) -> AppResult<Identity> {
        sqlx::query_as::<_, Identity>(
            "UPDATE identities SET last_tenant_id = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(tenant_id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record last tenant", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))
    }

    async fn set_active(
        &self,
        id: IdentityId,
        active: bool,
        actor: IdentityId,
    ) -> AppResult<Identity> {
        sqlx::query_as::<_, Identity>(
            "UPDATE identities SET active = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update active flag", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Identity {id} not found")))
    }

    async fn delete(&self, id: IdentityId) -> AppResult<Option<IdentityRemoval>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let memberships = sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE identity_id = $1 ORDER BY seq FOR UPDATE",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load memberships", e))?;

        let identity =
            sqlx::query_as::<_, Identity>("DELETE FROM identities WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to delete identity", e)
                })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        Ok(identity.map(|identity| IdentityRemoval {
            identity,
            memberships,
        }))
    }
}
