//! Workspace, role and membership CLI commands.

use anyhow::Context;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use warden_auth::PermissionEnforcer;
use warden_core::config::AppConfig;
use warden_core::types::{IdentityId, TenantId};
use warden_entity::role::Permission;
use warden_entity::tenant::TenantStatus;
use warden_service::Services;

use crate::output::{self, OutputFormat};

/// Arguments for workspace commands
#[derive(Debug, Args)]
pub struct WorkspaceArgs {
    /// Access token of the acting identity, scoped to the target workspace.
    /// Required by commands that change a workspace.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Workspace subcommand
    #[command(subcommand)]
    pub command: WorkspaceCommand,
}

/// Workspace subcommands
#[derive(Debug, Subcommand)]
pub enum WorkspaceCommand {
    /// List the workspaces an identity can use, primary first
    List {
        /// Email address
        email: String,
    },
    /// Create a workspace owned by an identity
    Create {
        /// Owner email address
        email: String,
        /// Workspace name
        #[arg(short, long)]
        name: String,
    },
    /// Suspend a workspace
    Suspend {
        /// Tenant id
        tenant: TenantId,
    },
    /// Reactivate a suspended workspace
    Resume {
        /// Tenant id
        tenant: TenantId,
    },
    /// Rename a workspace
    Rename {
        /// Tenant id
        tenant: TenantId,
        /// New name
        name: String,
    },
    /// List the roles of a workspace
    Roles {
        /// Tenant id
        tenant: TenantId,
    },
    /// Add an identity to a workspace
    AddMember {
        /// Tenant id
        tenant: TenantId,
        /// Member email address
        email: String,
        /// Role name
        #[arg(short, long, default_value = "viewer")]
        role: String,
    },
    /// Revoke an identity's membership
    RemoveMember {
        /// Tenant id
        tenant: TenantId,
        /// Member email address
        email: String,
    },
    /// List the permission catalog
    Permissions,
}

/// Workspace display row for table output
#[derive(Debug, Serialize, Tabled)]
struct WorkspaceRow {
    /// Tenant ID
    id: String,
    /// Name
    name: String,
    /// Status
    status: String,
    /// Plan
    plan: String,
    /// Role held
    role: String,
    /// Primary
    primary: bool,
}

/// Role display row for table output
#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    /// Role ID
    id: String,
    /// Name
    name: String,
    /// System role
    system: bool,
    /// Permission codes
    permissions: String,
}

#[derive(Debug, Serialize, Tabled)]
struct PermissionRow {
    code: String,
}

/// Execute workspace commands
pub async fn execute(
    args: &WorkspaceArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (_pool, services) = super::connect(config).await?;
    let token = args.token.as_deref();

    match &args.command {
        WorkspaceCommand::List { email } => {
            let identity = super::identity_by_email(&services, email).await?;
            let rows: Vec<WorkspaceRow> = services
                .sessions
                .workspaces_of(identity.id)
                .await?
                .into_iter()
                .map(|w| WorkspaceRow {
                    id: w.tenant.id.to_string(),
                    name: w.tenant.name,
                    status: w.tenant.status.to_string(),
                    plan: w.tenant.plan.to_string(),
                    role: w.role,
                    primary: w.primary,
                })
                .collect();
            output::print_list(&rows, format);
        }
        WorkspaceCommand::Create { email, name } => {
            let owner = super::identity_by_email(&services, email).await?;
            let tenant = services.sessions.create_workspace(owner.id, name).await?;
            output::print_success(&format!("Workspace '{}' created", tenant.name));
            output::print_item(&tenant, format);
        }
        WorkspaceCommand::Suspend { tenant } | WorkspaceCommand::Resume { tenant } => {
            let status = match args.command {
                WorkspaceCommand::Suspend { .. } => TenantStatus::Suspended,
                _ => TenantStatus::Active,
            };
            let actor = authorize(&services, token, *tenant, Permission::WorkspaceSettings)?;
            let updated = services.tenants.set_status(actor, *tenant, status).await?;
            output::print_success(&format!("Workspace '{}' is now {status}", updated.name));
        }
        WorkspaceCommand::Rename { tenant, name } => {
            let actor = authorize(&services, token, *tenant, Permission::WorkspaceSettings)?;
            let renamed = services.tenants.rename(actor, *tenant, name).await?;
            output::print_success(&format!("Workspace renamed to '{}'", renamed.name));
        }
        WorkspaceCommand::Roles { tenant } => {
            let rows: Vec<RoleRow> = services
                .roles
                .roles_of(*tenant)
                .await?
                .into_iter()
                .map(|r| RoleRow {
                    id: r.id.to_string(),
                    name: r.name,
                    system: r.system,
                    permissions: r.permissions.join(", "),
                })
                .collect();
            output::print_list(&rows, format);
        }
        WorkspaceCommand::AddMember {
            tenant,
            email,
            role,
        } => {
            let actor = authorize(&services, token, *tenant, Permission::WorkspaceMembers)?;
            let member = super::identity_by_email(&services, email).await?;
            let role = services
                .roles
                .roles_of(*tenant)
                .await?
                .into_iter()
                .find(|r| &r.name == role)
                .with_context(|| format!("Workspace {tenant} has no role named '{role}'"))?;

            services
                .memberships
                .add_membership(actor, member.id, *tenant, role.id)
                .await?;
            output::print_success(&format!("'{email}' joined as {}", role.name));
        }
        WorkspaceCommand::RemoveMember { tenant, email } => {
            let actor = authorize(&services, token, *tenant, Permission::WorkspaceMembers)?;
            let member = super::identity_by_email(&services, email).await?;
            services
                .memberships
                .revoke_membership(actor, member.id, *tenant)
                .await?;
            output::print_success(&format!("Membership of '{email}' revoked"));
        }
        WorkspaceCommand::Permissions => {
            let rows: Vec<PermissionRow> = services
                .roles
                .permission_catalog()
                .await?
                .into_iter()
                .map(|code| PermissionRow { code })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}

/// Validate `token` and require `permission` in `tenant`, returning the
/// acting identity.
fn authorize(
    services: &Services,
    token: Option<&str>,
    tenant: TenantId,
    permission: Permission,
) -> anyhow::Result<IdentityId> {
    let token = token.context("This command requires --token <access token>")?;
    let claims = services.tokens.validate_access(token)?;
    PermissionEnforcer::new().require(&claims, tenant, permission)?;
    Ok(claims.identity_id())
}
