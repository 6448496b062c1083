//! Membership repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::{IdentityId, MembershipId, TenantId};
use warden_entity::membership::{Membership, NewMembership};

use crate::store::MembershipStore;

const ACTIVE_PAIR_CONSTRAINT: &str = "memberships_active_pair_key";

/// PostgreSQL-backed [`MembershipStore`].
#[derive(Debug, Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    /// Create a new membership repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipStore for MembershipRepository {
    async fn find_active_by_identity(
        &self,
        identity_id: IdentityId,
    ) -> AppResult<Vec<Membership>> {
        sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships WHERE identity_id = $1 AND status = 'active' ORDER BY seq",
        )
        .bind(identity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list memberships", e))
    }

    async fn find_active(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> AppResult<Option<Membership>> {
        sqlx::query_as::<_, Membership>(
            "SELECT * FROM memberships \
             WHERE identity_id = $1 AND tenant_id = $2 AND status = 'active'",
        )
        .bind(identity_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find membership", e))
    }

    async fn insert_active(&self, data: &NewMembership) -> AppResult<Membership> {
        sqlx::query_as::<_, Membership>(
            "INSERT INTO memberships (id, identity_id, tenant_id, role_id, updated_by) \
             SELECT $1, $2, $3, r.id, $5 FROM roles r WHERE r.id = $4 AND r.tenant_id = $3 \
             RETURNING *",
        )
        .bind(MembershipId::new())
        .bind(data.identity_id)
        .bind(data.tenant_id)
        .bind(data.role_id)
        .bind(data.created_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some(ACTIVE_PAIR_CONSTRAINT) =>
            {
                AppError::already_exists(format!(
                    "Identity {} is already a member of tenant {}",
                    data.identity_id, data.tenant_id
                ))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert membership", e),
        })?
        .ok_or_else(|| {
            AppError::validation(format!(
                "Role {} does not belong to tenant {}",
                data.role_id, data.tenant_id
            ))
        })
    }

    async fn revoke(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
        actor: IdentityId,
    ) -> AppResult<Option<Membership>> {
        sqlx::query_as::<_, Membership>(
            "UPDATE memberships SET status = 'revoked', revoked_at = NOW(), updated_by = $3 \
             WHERE identity_id = $1 AND tenant_id = $2 AND status = 'active' \
             RETURNING *",
        )
        .bind(identity_id)
        .bind(tenant_id)
        .bind(actor)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to revoke membership", e))
    }
}
