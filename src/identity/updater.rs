//! Tenant assignment against the identity provider and profile store.

use std::sync::Arc;

use tracing::debug;

use crate::clock::Clock;
use crate::identity::claims::assign_tenant;
use crate::identity::profile::{ProfileStore, TenantSource};
use crate::identity::provider::IdentityProvider;
use crate::TenantPassError;

/// Merges a tenant assignment into a user's token claims and mirrors it
/// into the user's profile record.
#[derive(Clone)]
pub struct ClaimsUpdater {
    provider: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    clock: Arc<dyn Clock>,
}

impl ClaimsUpdater {
    /// Wire an updater over a provider and profile store.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            profiles,
            clock,
        }
    }

    /// Assign `tenant_id` to `user_id`, preserving all other claims, then
    /// mirror the assignment and its source into the profile.
    ///
    /// The write is last-write-wins across the three assignment paths
    /// (domain default, manual assignment, key redemption).
    pub fn assign(
        &self,
        user_id: &str,
        tenant_id: &str,
        source: TenantSource,
    ) -> Result<(), TenantPassError> {
        let current = self.provider.claims(user_id)?;
        let next = assign_tenant(&current, tenant_id);
        self.provider.set_claims(user_id, next)?;

        self.profiles
            .record_assignment(user_id, tenant_id, source, self.clock.now_utc())?;

        debug!(user = user_id, tenant = tenant_id, ?source, "assigned tenant");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::identity::claims::ClaimSet;
    use crate::identity::profile::MemoryProfileStore;
    use crate::identity::provider::MemoryIdentityProvider;

    fn updater() -> (ClaimsUpdater, Arc<MemoryIdentityProvider>, Arc<MemoryProfileStore>) {
        let provider = Arc::new(MemoryIdentityProvider::new());
        let profiles = Arc::new(MemoryProfileStore::new());
        let clock = Arc::new(MockClock::from_rfc3339("2026-02-01T12:00:00Z"));
        (
            ClaimsUpdater::new(provider.clone(), profiles.clone(), clock),
            provider,
            profiles,
        )
    }

    #[test]
    fn test_assign_writes_claims_and_profile() {
        let (updater, provider, profiles) = updater();

        updater
            .assign("user-1", "demo", TenantSource::AccessKey)
            .unwrap();

        assert_eq!(
            provider.claims("user-1").unwrap().tenant_id.as_deref(),
            Some("demo")
        );
        let profile = profiles.profile("user-1").unwrap().unwrap();
        assert_eq!(profile.tenant_id.as_deref(), Some("demo"));
        assert_eq!(profile.tenant_access_source, Some(TenantSource::AccessKey));
        assert!(profile.tenant_access_granted_at.is_some());
    }

    #[test]
    fn test_assign_preserves_admin_flag() {
        let (updater, provider, _) = updater();
        provider
            .set_claims(
                "user-1",
                ClaimSet {
                    admin: true,
                    ..ClaimSet::default()
                },
            )
            .unwrap();

        updater
            .assign("user-1", "demo", TenantSource::AdminAssignment)
            .unwrap();

        let claims = provider.claims("user-1").unwrap();
        assert!(claims.admin);
        assert_eq!(claims.tenant_id.as_deref(), Some("demo"));
    }

    #[test]
    fn test_reassignment_overwrites() {
        let (updater, provider, profiles) = updater();

        updater
            .assign("user-1", "starter-academy", TenantSource::DomainDefault)
            .unwrap();
        updater
            .assign("user-1", "demo", TenantSource::AccessKey)
            .unwrap();

        assert_eq!(
            provider.claims("user-1").unwrap().tenant_id.as_deref(),
            Some("demo")
        );
        let profile = profiles.profile("user-1").unwrap().unwrap();
        assert_eq!(profile.tenant_access_source, Some(TenantSource::AccessKey));
    }
}
