//! Token and session CLI commands.

use clap::{Args, Subcommand};

use warden_auth::TokenKind;
use warden_core::config::AppConfig;
use warden_core::error::ErrorKind;
use warden_core::types::TenantId;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Exchange a refresh token for a new access token
    Refresh {
        /// Refresh token
        token: String,
    },
    /// Re-scope a session to another workspace
    Switch {
        /// Access token of the current session
        token: String,
        /// Target tenant id
        #[arg(short, long)]
        tenant: TenantId,
    },
    /// Validate a token and print its claims
    Inspect {
        /// Access or refresh token
        token: String,
    },
    /// End a session
    Logout,
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (_pool, services) = super::connect(config).await?;

    match &args.command {
        SessionCommand::Refresh { token } => {
            let refreshed = services.sessions.refresh(token).await?;
            output::print_item(&refreshed, format);
        }
        SessionCommand::Switch { token, tenant } => {
            let claims = services.tokens.validate_access(token)?;
            let pair = services
                .sessions
                .switch_tenant(claims.identity_id(), *tenant)
                .await?;
            output::print_success(&format!("Switched to workspace {tenant}"));
            output::print_item(&pair, format);
        }
        SessionCommand::Inspect { token } => {
            let claims = match services.tokens.validate(token, TokenKind::Access) {
                Err(e) if e.is(ErrorKind::TokenKindMismatch) => {
                    services.tokens.validate(token, TokenKind::Refresh)?
                }
                other => other?,
            };
            output::print_item(&claims, format);
        }
        SessionCommand::Logout => {
            let ack = services.sessions.logout();
            output::print_item(&ack, format);
            output::print_success("Discard both the access and the refresh token.");
        }
    }

    Ok(())
}
