//! Identity-provider admin capability.
//!
//! The provider owns token claims; this crate only reads a user's claim
//! blob and writes a merged replacement. Deployments wire an adapter for
//! their provider's admin API; the in-memory implementation backs tests
//! and local development.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::identity::claims::ClaimSet;
use crate::TenantPassError;

/// Admin capability to read and replace a user's token claims.
pub trait IdentityProvider: Send + Sync {
    /// The user's current claim set. Users without custom claims yield an
    /// empty set, not an error.
    fn claims(&self, user_id: &str) -> Result<ClaimSet, TenantPassError>;

    /// Replace the user's claim set. The caller is responsible for having
    /// merged the previous set; this is a full overwrite on the provider.
    fn set_claims(&self, user_id: &str, claims: ClaimSet) -> Result<(), TenantPassError>;
}

/// In-memory [`IdentityProvider`].
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityProvider {
    claims: Arc<RwLock<BTreeMap<String, ClaimSet>>>,
}

impl MemoryIdentityProvider {
    /// Create a provider with no claims recorded.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    fn claims(&self, user_id: &str) -> Result<ClaimSet, TenantPassError> {
        Ok(self.claims.read().get(user_id).cloned().unwrap_or_default())
    }

    fn set_claims(&self, user_id: &str, claims: ClaimSet) -> Result<(), TenantPassError> {
        self.claims.write().insert(user_id.to_string(), claims);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_has_empty_claims() {
        let provider = MemoryIdentityProvider::new();
        let claims = provider.claims("nobody").unwrap();
        assert_eq!(claims, ClaimSet::default());
    }

    #[test]
    fn test_set_then_get() {
        let provider = MemoryIdentityProvider::new();
        let claims = ClaimSet {
            tenant_id: Some("demo".to_string()),
            admin: true,
            ..ClaimSet::default()
        };
        provider.set_claims("user-1", claims.clone()).unwrap();
        assert_eq!(provider.claims("user-1").unwrap(), claims);
    }

    #[test]
    fn test_set_replaces_whole_blob() {
        let provider = MemoryIdentityProvider::new();
        provider
            .set_claims(
                "user-1",
                ClaimSet {
                    admin: true,
                    ..ClaimSet::default()
                },
            )
            .unwrap();
        provider.set_claims("user-1", ClaimSet::default()).unwrap();
        assert!(!provider.claims("user-1").unwrap().admin);
    }
}
