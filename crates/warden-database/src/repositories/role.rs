//! Role repository implementation.
//!
//! A role's permission codes live in `role_permissions`; every read folds
//! them back into a sorted array.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use warden_core::error::{AppError, ErrorKind};
use warden_core::result::AppResult;
use warden_core::types::{RoleId, TenantId};
use warden_entity::role::{NewRole, Role};

use crate::store::RoleStore;

const ROLE_SELECT: &str = "SELECT r.id, r.tenant_id, r.name, r.description, r.system, r.created_at, \
     COALESCE(ARRAY_AGG(rp.permission_code ORDER BY rp.permission_code) \
              FILTER (WHERE rp.permission_code IS NOT NULL), '{}'::TEXT[]) AS permissions \
     FROM roles r LEFT JOIN role_permissions rp ON rp.role_id = r.id";

/// PostgreSQL-backed [`RoleStore`].
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insert a role and its permission rows unless (tenant, name) is taken.
pub(crate) async fn insert_role(
    tx: &mut Transaction<'_, Postgres>,
    data: &NewRole,
) -> AppResult<Option<Role>> {
    let mut permissions = data.permissions.clone();
    permissions.sort();
    permissions.dedup();

    let row: Option<(RoleId, chrono::DateTime<chrono::Utc>)> = sqlx::query_as(
        "INSERT INTO roles (id, tenant_id, name, description, system) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (tenant_id, name) DO NOTHING \
         RETURNING id, created_at",
    )
    .bind(RoleId::new())
    .bind(data.tenant_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.system)
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert role", e))?;

    let Some((id, created_at)) = row else {
        return Ok(None);
    };

    sqlx::query(
        "INSERT INTO role_permissions (role_id, permission_code) SELECT $1, UNNEST($2::TEXT[])",
    )
    .bind(id)
    .bind(&permissions)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        AppError::with_source(ErrorKind::Database, "Failed to assign role permissions", e)
    })?;

    Ok(Some(Role {
        id,
        tenant_id: data.tenant_id,
        name: data.name.clone(),
        description: data.description.clone(),
        system: data.system,
        permissions,
        created_at,
    }))
}

#[async_trait]
impl RoleStore for RoleRepository {
    async fn find_by_tenant(&self, tenant_id: TenantId) -> AppResult<Vec<Role>> {
        sqlx::query_as::<_, Role>(&format!(
            "{ROLE_SELECT} WHERE r.tenant_id = $1 GROUP BY r.id ORDER BY r.name"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tenant roles", e))
    }

    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>(&format!("{ROLE_SELECT} WHERE r.id = $1 GROUP BY r.id"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role", e))
    }

    async fn find_by_name(&self, tenant_id: TenantId, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>(&format!(
            "{ROLE_SELECT} WHERE r.tenant_id = $1 AND r.name = $2 GROUP BY r.id"
        ))
        .bind(tenant_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role by name", e))
    }

    async fn insert_missing(&self, roles: &[NewRole]) -> AppResult<Vec<Role>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let mut inserted = Vec::new();
        for data in roles {
            if let Some(role) = insert_role(&mut tx, data).await? {
                inserted.push(role);
            }
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;
        Ok(inserted)
    }

    async fn permission_catalog(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT code FROM permissions ORDER BY code")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load permission catalog", e)
            })
    }
}
