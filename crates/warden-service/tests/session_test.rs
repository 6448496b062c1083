//! Integration tests for the session lifecycle.

mod helpers;

use helpers::{SECRET, TestApp};
use warden_auth::PermissionEnforcer;
use warden_core::config::AuthConfig;
use warden_core::error::{ACCESS_DENIED_MESSAGE, ErrorKind};
use warden_core::types::TenantId;
use warden_database::{MembershipStore, RoleStore};
use warden_entity::role::{Permission, StandingRole};
use warden_entity::tenant::TenantStatus;
use warden_service::SignupRequest;

#[tokio::test]
async fn test_signup_creates_owned_workspace() {
    let app = TestApp::new();
    let session = app.signup("ann@example.com", "Ann").await;

    assert_eq!(session.tenant.name, "Ann's Workspace");
    assert_eq!(session.role, "owner");
    assert_eq!(session.permissions, {
        let mut all = Permission::all_codes();
        all.sort();
        all
    });

    let claims = app
        .services
        .tokens
        .validate_access(&session.access.token)
        .unwrap();
    assert_eq!(claims.identity_id(), session.identity.id);
    assert_eq!(claims.tenant_id(), session.tenant.id);
    assert_eq!(claims.grant.role, "owner");
    assert_eq!(claims.grant.email, "ann@example.com");

    let roles = app.services.roles.roles_of(session.tenant.id).await.unwrap();
    let mut names: Vec<_> = roles.iter().map(|r| r.name.as_str()).collect();
    names.sort();
    assert_eq!(names, ["owner", "viewer"]);
}

#[tokio::test]
async fn test_signup_with_short_secret_under_default_policy() {
    let app = TestApp::new();
    let session = app
        .services
        .sessions
        .signup(SignupRequest {
            email: "a@x.com".into(),
            secret: "pw".into(),
            name: "Ann".into(),
        })
        .await
        .unwrap();
    let ann = session.identity.id;

    let workspaces = app.services.sessions.workspaces_of(ann).await.unwrap();
    assert_eq!(workspaces.len(), 1);
    assert_eq!(workspaces[0].tenant.name, "Ann's Workspace");
    assert!(workspaces[0].primary);

    let memberships = MembershipStore::find_active_by_identity(&app.store, ann)
        .await
        .unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].tenant_id, session.tenant.id);
    let role = RoleStore::find_by_id(&app.store, memberships[0].role_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(role.name, "owner");
}

#[tokio::test]
async fn test_signup_rejects_duplicate_email() {
    let app = TestApp::new();
    app.signup("ann@example.com", "Ann").await;

    let duplicate = app
        .services
        .sessions
        .signup(SignupRequest {
            email: "ann@example.com".into(),
            secret: SECRET.into(),
            name: "Other".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate.kind, ErrorKind::AlreadyExists);
}

#[tokio::test]
async fn test_signup_under_strict_policy_rejects_weak_secret() {
    let app = TestApp::with_auth(AuthConfig {
        password_min_length: 8,
        password_check_strength: true,
        ..AuthConfig::default()
    });

    let weak = app
        .services
        .sessions
        .signup(SignupRequest {
            email: "bob@example.com".into(),
            secret: "abc".into(),
            name: "Bob".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(weak.kind, ErrorKind::Validation);
    assert!(
        app.services
            .identities
            .find_by_email("bob@example.com")
            .await
            .unwrap()
            .is_none()
    );

    app.signup("bob@example.com", "Bob").await;
}

#[tokio::test]
async fn test_login_scopes_to_primary_tenant() {
    let app = TestApp::new();
    let signup = app.signup("ann@example.com", "Ann").await;
    let ann = signup.identity.id;
    let second = app
        .services
        .sessions
        .create_workspace(ann, "Side Project")
        .await
        .unwrap();

    let session = app.services.sessions.login("ann@example.com", SECRET).await.unwrap();
    assert_eq!(session.tenant.id, signup.tenant.id);

    app.services
        .sessions
        .switch_tenant(ann, second.id)
        .await
        .unwrap();

    let session = app.services.sessions.login("ann@example.com", SECRET).await.unwrap();
    assert_eq!(session.tenant.id, second.id);
    let claims = app
        .services
        .tokens
        .validate_access(&session.access.token)
        .unwrap();
    assert_eq!(claims.tenant_id(), second.id);

    let workspaces = app.services.sessions.workspaces_of(ann).await.unwrap();
    assert_eq!(workspaces.len(), 2);
    assert!(workspaces[0].primary);
    assert_eq!(workspaces[0].tenant.id, second.id);
    assert!(!workspaces[1].primary);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    let session = app.signup("ann@example.com", "Ann").await;
    app.signup("bob@example.com", "Bob").await;
    app.services
        .identities
        .set_active(session.identity.id, session.identity.id, false)
        .await
        .unwrap();

    let wrong_secret = app
        .services
        .sessions
        .login("bob@example.com", "not-the-secret")
        .await
        .unwrap_err();
    let unknown = app
        .services
        .sessions
        .login("nobody@example.com", SECRET)
        .await
        .unwrap_err();
    let inactive = app
        .services
        .sessions
        .login("ann@example.com", SECRET)
        .await
        .unwrap_err();

    for err in [&wrong_secret, &unknown, &inactive] {
        assert_eq!(err.kind, ErrorKind::CredentialsInvalid);
    }
    assert_eq!(wrong_secret.message, unknown.message);
    assert_eq!(unknown.message, inactive.message);
}

#[tokio::test]
async fn test_login_without_active_membership() {
    let app = TestApp::new();
    let session = app.signup("ann@example.com", "Ann").await;
    let ann = session.identity.id;

    app.services
        .memberships
        .revoke_membership(ann, ann, session.tenant.id)
        .await
        .unwrap();

    let err = app
        .services
        .sessions
        .login("ann@example.com", SECRET)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoActiveTenant);
}

#[tokio::test]
async fn test_login_skips_suspended_tenant() {
    let app = TestApp::new();
    let signup = app.signup("ann@example.com", "Ann").await;
    let ann = signup.identity.id;
    let second = app
        .services
        .sessions
        .create_workspace(ann, "Side Project")
        .await
        .unwrap();

    app.services
        .tenants
        .set_status(ann, signup.tenant.id, TenantStatus::Suspended)
        .await
        .unwrap();
    let session = app.services.sessions.login("ann@example.com", SECRET).await.unwrap();
    assert_eq!(session.tenant.id, second.id);

    app.services
        .tenants
        .set_status(ann, second.id, TenantStatus::Suspended)
        .await
        .unwrap();
    let err = app
        .services
        .sessions
        .login("ann@example.com", SECRET)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoActiveTenant);
}

#[tokio::test]
async fn test_switch_denied_for_foreign_and_unknown_tenant() {
    let app = TestApp::new();
    let ann = app.signup("ann@example.com", "Ann").await;
    let bob = app.signup("bob@example.com", "Bob").await;

    let foreign = app
        .services
        .sessions
        .switch_tenant(ann.identity.id, bob.tenant.id)
        .await
        .unwrap_err();
    let unknown = app
        .services
        .sessions
        .switch_tenant(ann.identity.id, TenantId::new())
        .await
        .unwrap_err();

    assert_eq!(foreign.kind, ErrorKind::AccessDenied);
    assert_eq!(unknown.kind, ErrorKind::AccessDenied);
    assert_eq!(foreign.message, ACCESS_DENIED_MESSAGE);
    assert_eq!(foreign.message, unknown.message);
}

#[tokio::test]
async fn test_switch_reissues_pair_with_member_role() {
    let app = TestApp::new();
    let ann = app.signup("ann@example.com", "Ann").await;
    let bob = app.signup("bob@example.com", "Bob").await;
    let viewer = app
        .services
        .roles
        .standing_role(ann.tenant.id, StandingRole::Viewer)
        .await
        .unwrap();
    app.services
        .memberships
        .add_membership(ann.identity.id, bob.identity.id, ann.tenant.id, viewer.id)
        .await
        .unwrap();

    let pair = app
        .services
        .sessions
        .switch_tenant(bob.identity.id, ann.tenant.id)
        .await
        .unwrap();
    let claims = app.services.tokens.validate_access(&pair.access.token).unwrap();
    assert_eq!(claims.tenant_id(), ann.tenant.id);
    assert_eq!(claims.grant.role, "viewer");
    assert!(claims.has_permission(Permission::TransactionRead.as_str()));
    assert!(!claims.has_permission(Permission::UserWrite.as_str()));

    let refresh = app.services.tokens.validate_refresh(&pair.refresh.token).unwrap();
    assert_eq!(refresh.tid, ann.tenant.id);
}

#[tokio::test]
async fn test_session_tokens_gate_workspace_administration() {
    let app = TestApp::new();
    let ann = app.signup("ann@example.com", "Ann").await;
    let bob = app.signup("bob@example.com", "Bob").await;
    let viewer = app
        .services
        .roles
        .standing_role(ann.tenant.id, StandingRole::Viewer)
        .await
        .unwrap();
    app.services
        .memberships
        .add_membership(ann.identity.id, bob.identity.id, ann.tenant.id, viewer.id)
        .await
        .unwrap();
    let enforcer = PermissionEnforcer::new();

    let owner = app.services.tokens.validate_access(&ann.access.token).unwrap();
    enforcer
        .require(&owner, ann.tenant.id, Permission::WorkspaceMembers)
        .unwrap();
    let foreign = enforcer
        .require(&owner, bob.tenant.id, Permission::WorkspaceMembers)
        .unwrap_err();
    assert_eq!(foreign.kind, ErrorKind::AccessDenied);

    let pair = app
        .services
        .sessions
        .switch_tenant(bob.identity.id, ann.tenant.id)
        .await
        .unwrap();
    let member = app.services.tokens.validate_access(&pair.access.token).unwrap();
    enforcer
        .require(&member, ann.tenant.id, Permission::WorkspaceRead)
        .unwrap();
    let denied = enforcer
        .require(&member, ann.tenant.id, Permission::WorkspaceSettings)
        .unwrap_err();
    assert_eq!(denied.kind, ErrorKind::AccessDenied);
}

#[tokio::test]
async fn test_refresh_keeps_tenant_and_rejects_access_token() {
    let app = TestApp::new();
    let session = app.signup("ann@example.com", "Ann").await;

    let refreshed = app
        .services
        .sessions
        .refresh(&session.refresh.token)
        .await
        .unwrap();
    let claims = app
        .services
        .tokens
        .validate_access(&refreshed.access.token)
        .unwrap();
    assert_eq!(claims.tenant_id(), session.tenant.id);
    assert_eq!(claims.grant.role, "owner");

    let err = app
        .services
        .sessions
        .refresh(&session.access.token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenKindMismatch);

    let err = app
        .services
        .tokens
        .validate_access(&session.refresh.token)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::TokenKindMismatch);
}

#[tokio::test]
async fn test_refresh_after_membership_revoked() {
    let app = TestApp::new();
    let signup = app.signup("ann@example.com", "Ann").await;
    let ann = signup.identity.id;
    app.services
        .sessions
        .create_workspace(ann, "Side Project")
        .await
        .unwrap();

    let session = app.services.sessions.login("ann@example.com", SECRET).await.unwrap();
    assert_eq!(session.tenant.id, signup.tenant.id);
    app.services
        .memberships
        .revoke_membership(ann, ann, signup.tenant.id)
        .await
        .unwrap();

    let err = app
        .services
        .sessions
        .refresh(&session.refresh.token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AccessDenied);
}

#[tokio::test]
async fn test_refresh_for_deactivated_identity() {
    let app = TestApp::new();
    let session = app.signup("ann@example.com", "Ann").await;
    app.services
        .identities
        .set_active(session.identity.id, session.identity.id, false)
        .await
        .unwrap();

    let err = app
        .services
        .sessions
        .refresh(&session.refresh.token)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CredentialsInvalid);
}

#[tokio::test]
async fn test_logout_clears_both_credentials() {
    let app = TestApp::new();
    let ack = app.services.sessions.logout();
    assert!(ack.clear_access);
    assert!(ack.clear_refresh);
}
