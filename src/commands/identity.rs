//! Identity management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;

use warden_core::config::AppConfig;
use warden_core::types::TenantId;
use warden_entity::identity::IdentitySummary;
use warden_service::SignupRequest;

use crate::output::{self, OutputFormat};

/// Arguments for identity commands
#[derive(Debug, Args)]
pub struct IdentityArgs {
    /// Email of the acting identity for administrative changes
    #[arg(long, global = true)]
    pub actor: Option<String>,

    /// Identity subcommand
    #[command(subcommand)]
    pub command: IdentityCommand,
}

/// Identity subcommands
#[derive(Debug, Subcommand)]
pub enum IdentityCommand {
    /// Register an identity with its own workspace
    Signup {
        /// Email address
        email: String,
        /// Display name
        #[arg(short, long)]
        name: String,
    },
    /// Authenticate and print a session
    Login {
        /// Email address
        email: String,
    },
    /// Show an identity
    Show {
        /// Email address
        email: String,
    },
    /// Re-enable a deactivated identity
    Activate {
        /// Email address
        email: String,
    },
    /// Block an identity from logging in
    Deactivate {
        /// Email address
        email: String,
    },
    /// Change the email of an identity and reissue its access token
    ChangeEmail {
        /// Current email address
        email: String,
        /// New email address
        new_email: String,
        /// Tenant the reissued token is scoped to
        #[arg(short, long)]
        tenant: TenantId,
    },
    /// Delete an identity and all its memberships
    Delete {
        /// Email address
        email: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize)]
struct AccessRow {
    access_token: String,
    expires_at: String,
}

/// Execute identity commands
pub async fn execute(
    args: &IdentityArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (_pool, services) = super::connect(config).await?;

    match &args.command {
        IdentityCommand::Signup { email, name } => {
            let secret = super::prompt_secret(true)?;
            let session = services
                .sessions
                .signup(SignupRequest {
                    email: email.clone(),
                    secret,
                    name: name.clone(),
                })
                .await?;
            output::print_success(&format!(
                "Registered '{}' with workspace '{}'",
                session.identity.email, session.tenant.name
            ));
            output::print_item(&session, format);
        }
        IdentityCommand::Login { email } => {
            let secret = super::prompt_secret(false)?;
            let session = services.sessions.login(email, &secret).await?;
            output::print_item(&session, format);
        }
        IdentityCommand::Show { email } => {
            let identity = super::identity_by_email(&services, email).await?;
            output::print_item(&IdentitySummary::from(&identity), format);
        }
        IdentityCommand::Activate { email } | IdentityCommand::Deactivate { email } => {
            let active = matches!(args.command, IdentityCommand::Activate { .. });
            let identity = super::identity_by_email(&services, email).await?;
            let actor =
                super::resolve_actor(&services, args.actor.as_deref(), Some(identity.id)).await?;
            services
                .identities
                .set_active(actor, identity.id, active)
                .await?;
            let verb = if active { "activated" } else { "deactivated" };
            output::print_success(&format!("Identity '{email}' {verb}"));
        }
        IdentityCommand::ChangeEmail {
            email,
            new_email,
            tenant,
        } => {
            let identity = super::identity_by_email(&services, email).await?;
            let access = services
                .sessions
                .change_email(identity.id, *tenant, new_email)
                .await?;
            output::print_success(&format!("Email changed to '{new_email}'"));
            output::print_item(
                &AccessRow {
                    access_token: access.token,
                    expires_at: access.expires_at.to_rfc3339(),
                },
                format,
            );
        }
        IdentityCommand::Delete { email, force } => {
            let identity = super::identity_by_email(&services, email).await?;
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete '{email}' and all of its memberships? This cannot be undone."
                    ))
                    .default(false)
                    .interact()?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let actor =
                super::resolve_actor(&services, args.actor.as_deref(), Some(identity.id)).await?;
            if services.identities.delete(actor, identity.id).await? {
                output::print_success(&format!("Identity '{email}' deleted"));
            } else {
                output::print_error(&format!("Identity '{email}' was already gone"));
            }
        }
    }

    Ok(())
}
