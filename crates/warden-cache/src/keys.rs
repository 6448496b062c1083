//! Cache key builders.
//!
//! Every cached entry is addressed by exactly one of these keys, so the
//! invalidation for a mutation can name the keys it affects precisely.
//! Backend prefixes (e.g. `warden:` for Redis) are applied by the provider.

use std::fmt::Display;

/// Identity by id.
pub fn identity_by_id(identity_id: impl Display) -> String {
    format!("identity-by-id:{identity_id}")
}

/// Identity by email. Emails are matched exactly, so the key is not
/// normalized.
pub fn identity_by_email(email: &str) -> String {
    format!("identity-by-email:{email}")
}

/// Active membership list of an identity.
pub fn memberships_by_user(identity_id: impl Display) -> String {
    format!("memberships-by-user:{identity_id}")
}

/// Active membership of an (identity, tenant) pair.
pub fn membership(identity_id: impl Display, tenant_id: impl Display) -> String {
    format!("membership:{identity_id}:{tenant_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_key_formats() {
        let user = Uuid::nil();
        let tenant = Uuid::max();
        assert_eq!(
            identity_by_id(user),
            "identity-by-id:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            membership(user, tenant),
            format!("membership:{user}:{tenant}")
        );
    }

    #[test]
    fn test_email_key_is_case_sensitive() {
        assert_ne!(
            identity_by_email("Ann@example.com"),
            identity_by_email("ann@example.com")
        );
    }
}
