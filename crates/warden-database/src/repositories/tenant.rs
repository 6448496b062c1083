//! Tenant repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::TenantId;
use warden_entity::role::{Role, StandingRole};
use warden_entity::tenant::{NewTenant, Tenant, TenantStatus};

use super::role::insert_role;
use crate::store::TenantStore;

/// PostgreSQL-backed [`TenantStore`].
#[derive(Debug, Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    /// Create a new tenant repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for TenantRepository {
    async fn create_with_roles(
        &self,
        data: &NewTenant,
        roles: &[StandingRole],
    ) -> AppResult<(Tenant, Vec<Role>)> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let tenant = sqlx::query_as::<_, Tenant>(
            "INSERT INTO tenants (id, name, plan, created_by) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(TenantId::new())
        .bind(&data.name)
        .bind(data.plan)
        .bind(data.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create tenant", e))?;

        let mut created = Vec::with_capacity(roles.len());
        for standing in roles {
            if let Some(role) = insert_role(&mut tx, &standing.new_role(tenant.id)).await? {
                created.push(role);
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        Ok((tenant, created))
    }

    async fn find_by_id(&self, id: TenantId) -> AppResult<Option<Tenant>> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find tenant", e))
    }

    async fn rename(&self, id: TenantId, name: &str) -> AppResult<Tenant> {
        sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to rename tenant", e))?
        .ok_or_else(|| AppError::not_found(format!("Tenant {id} not found")))
    }

    async fn set_status(&self, id: TenantId, status: TenantStatus) -> AppResult<Tenant> {
        sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update tenant status", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Tenant {id} not found")))
    }
}
