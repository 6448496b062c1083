//! Integration tests for cache population and invalidation.

mod helpers;

use helpers::{SECRET, TestApp};
use warden_cache::keys;
use warden_core::error::ErrorKind;
use warden_core::traits::cache::CacheProvider;
use warden_database::IdentityStore;

#[tokio::test]
async fn test_profile_update_refreshes_both_lookups() {
    let app = TestApp::new();
    let ann = app.signup("ann@example.com", "Ann").await.identity.id;
    let identities = &app.services.identities;

    identities.find_by_id(ann).await.unwrap();
    identities.find_by_email("ann@example.com").await.unwrap();
    assert!(app.cache.get(&keys::identity_by_id(ann)).await.unwrap().is_some());

    let updated = identities.update_profile(ann, ann, "  Annabel ").await.unwrap();
    assert_eq!(updated.display_name, "Annabel");

    let by_id = identities.find_by_id(ann).await.unwrap().unwrap();
    let by_email = identities
        .find_by_email("ann@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.display_name, "Annabel");
    assert_eq!(by_email.display_name, "Annabel");

    let blank = identities.update_profile(ann, ann, "   ").await.unwrap_err();
    assert_eq!(blank.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_identity_evict_drops_stale_entries() {
    let app = TestApp::new();
    let ann = app.signup("ann@example.com", "Ann").await.identity.id;
    let identities = &app.services.identities;

    identities.find_by_id(ann).await.unwrap();
    identities.find_by_email("ann@example.com").await.unwrap();

    // Bypass the service so the cached copies go stale
    IdentityStore::update_profile(&app.store, ann, "Changed Elsewhere", ann)
        .await
        .unwrap();
    let stale = identities.find_by_id(ann).await.unwrap().unwrap();
    assert_eq!(stale.display_name, "Ann");

    identities.evict(ann).await.unwrap();
    assert!(app.cache.get(&keys::identity_by_id(ann)).await.unwrap().is_none());
    assert!(
        app.cache
            .get(&keys::identity_by_email("ann@example.com"))
            .await
            .unwrap()
            .is_none()
    );

    let fresh = identities
        .find_by_email("ann@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fresh.display_name, "Changed Elsewhere");
}

#[tokio::test]
async fn test_membership_evict_drops_list_and_pair_entries() {
    let app = TestApp::new();
    let session = app.signup("ann@example.com", "Ann").await;
    let (ann, tenant) = (session.identity.id, session.tenant.id);
    let memberships = &app.services.memberships;

    memberships.active_memberships_of(ann).await.unwrap();
    memberships.membership_of(ann, tenant).await.unwrap();
    assert!(app.cache.get(&keys::memberships_by_user(ann)).await.unwrap().is_some());
    assert!(app.cache.get(&keys::membership(ann, tenant)).await.unwrap().is_some());

    memberships.evict(ann).await.unwrap();

    assert!(app.cache.get(&keys::memberships_by_user(ann)).await.unwrap().is_none());
    assert!(app.cache.get(&keys::membership(ann, tenant)).await.unwrap().is_none());
    assert_eq!(memberships.active_memberships_of(ann).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_wrong_secret_login_leaves_membership_keys_absent() {
    let app = TestApp::new();
    let session = app.signup("ann@example.com", "Ann").await;
    let (ann, tenant) = (session.identity.id, session.tenant.id);
    app.services.memberships.evict(ann).await.unwrap();

    let err = app
        .services
        .sessions
        .login("ann@example.com", "not-the-secret")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::CredentialsInvalid);

    assert!(app.cache.get(&keys::memberships_by_user(ann)).await.unwrap().is_none());
    assert!(app.cache.get(&keys::membership(ann, tenant)).await.unwrap().is_none());

    app.services
        .sessions
        .login("ann@example.com", SECRET)
        .await
        .unwrap();
    assert!(app.cache.get(&keys::memberships_by_user(ann)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_tenant_rename() {
    let app = TestApp::new();
    let session = app.signup("ann@example.com", "Ann").await;
    let tenants = &app.services.tenants;

    let renamed = tenants
        .rename(session.identity.id, session.tenant.id, " Research ")
        .await
        .unwrap();
    assert_eq!(renamed.name, "Research");
    assert_eq!(tenants.get(session.tenant.id).await.unwrap().name, "Research");

    let blank = tenants
        .rename(session.identity.id, session.tenant.id, "  ")
        .await
        .unwrap_err();
    assert_eq!(blank.kind, ErrorKind::Validation);
    assert_eq!(tenants.get(session.tenant.id).await.unwrap().name, "Research");
}
