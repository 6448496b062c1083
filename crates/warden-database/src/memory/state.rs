//! Tables backing [`MemoryStore`](super::MemoryStore).

use std::collections::{BTreeMap, HashMap};

use warden_core::types::{IdentityId, MembershipId, RoleId, TenantId};
use warden_entity::identity::Identity;
use warden_entity::membership::Membership;
use warden_entity::role::{Permission, Role};
use warden_entity::tenant::Tenant;

/// All rows held by the in-memory store.
///
/// Guarded by a single mutex so every check-then-write is serialized.
#[derive(Debug)]
pub struct State {
    pub(crate) identities: HashMap<IdentityId, Identity>,
    pub(crate) tenants: HashMap<TenantId, Tenant>,
    pub(crate) roles: HashMap<RoleId, Role>,
    pub(crate) memberships: BTreeMap<MembershipId, Membership>,
    pub(crate) permissions: Vec<String>,
    pub(crate) next_seq: i64,
}

impl Default for State {
    fn default() -> Self {
        let mut permissions = Permission::all_codes();
        permissions.sort();
        Self {
            identities: HashMap::new(),
            tenants: HashMap::new(),
            roles: HashMap::new(),
            memberships: BTreeMap::new(),
            permissions,
            next_seq: 1,
        }
    }
}

impl State {
    /// Hand out the next membership sequence number.
    pub(crate) fn next_seq(&mut self) -> i64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub(crate) fn email_taken(&self, email: &str, except: Option<IdentityId>) -> bool {
        self.identities
            .values()
            .any(|i| i.email == email && Some(i.id) != except)
    }

    pub(crate) fn active_membership(
        &self,
        identity_id: IdentityId,
        tenant_id: TenantId,
    ) -> Option<&Membership> {
        self.memberships.values().find(|m| {
            m.identity_id == identity_id && m.tenant_id == tenant_id && m.is_active()
        })
    }
}
