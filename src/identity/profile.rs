//! User profile documents.
//!
//! Profiles are owned by the surrounding platform; this crate writes only
//! the tenant assignment and its audit trail, and reads profiles back for
//! the per-tenant reporting query.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::TenantPassError;

/// How a user's tenant assignment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantSource {
    /// Default computed from the email domain at account creation.
    DomainDefault,
    /// Redemption of an access key.
    AccessKey,
    /// Manual assignment by an administrator.
    AdminAssignment,
}

/// The slice of a user profile this crate reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// The identity-provider user id.
    pub user_id: String,

    /// Current tenant assignment; None until first assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    /// When the current assignment was made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_access_granted_at: Option<DateTime<Utc>>,

    /// Which path made the current assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_access_source: Option<TenantSource>,
}

/// Repository over user profiles.
pub trait ProfileStore: Send + Sync {
    /// Read a profile.
    fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, TenantPassError>;

    /// Overwrite the tenant-assignment fields of a profile, creating the
    /// profile if it does not exist. Last write wins across assignment
    /// paths.
    fn record_assignment(
        &self,
        user_id: &str,
        tenant_id: &str,
        source: TenantSource,
        granted_at: DateTime<Utc>,
    ) -> Result<(), TenantPassError>;

    /// Every profile, for read-only aggregation.
    fn all_profiles(&self) -> Result<Vec<UserProfile>, TenantPassError>;
}

/// In-memory [`ProfileStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    profiles: Arc<RwLock<BTreeMap<String, UserProfile>>>,
}

impl MemoryProfileStore {
    /// Create a store with no profiles.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, TenantPassError> {
        Ok(self.profiles.read().get(user_id).cloned())
    }

    fn record_assignment(
        &self,
        user_id: &str,
        tenant_id: &str,
        source: TenantSource,
        granted_at: DateTime<Utc>,
    ) -> Result<(), TenantPassError> {
        let mut profiles = self.profiles.write();
        let profile = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile {
                user_id: user_id.to_string(),
                tenant_id: None,
                tenant_access_granted_at: None,
                tenant_access_source: None,
            });
        profile.tenant_id = Some(tenant_id.to_string());
        profile.tenant_access_granted_at = Some(granted_at);
        profile.tenant_access_source = Some(source);
        Ok(())
    }

    fn all_profiles(&self) -> Result<Vec<UserProfile>, TenantPassError> {
        Ok(self.profiles.read().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_assignment_creates_profile() {
        let store = MemoryProfileStore::new();
        let at = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();

        store
            .record_assignment("user-1", "demo", TenantSource::AccessKey, at)
            .unwrap();

        let profile = store.profile("user-1").unwrap().unwrap();
        assert_eq!(profile.tenant_id.as_deref(), Some("demo"));
        assert_eq!(profile.tenant_access_granted_at, Some(at));
        assert_eq!(profile.tenant_access_source, Some(TenantSource::AccessKey));
    }

    #[test]
    fn test_last_assignment_wins() {
        let store = MemoryProfileStore::new();
        let first = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        let second = first + chrono::Duration::minutes(5);

        store
            .record_assignment("user-1", "starter-academy", TenantSource::DomainDefault, first)
            .unwrap();
        store
            .record_assignment("user-1", "demo", TenantSource::AccessKey, second)
            .unwrap();

        let profile = store.profile("user-1").unwrap().unwrap();
        assert_eq!(profile.tenant_id.as_deref(), Some("demo"));
        assert_eq!(profile.tenant_access_source, Some(TenantSource::AccessKey));
    }

    #[test]
    fn test_source_wire_format() {
        let json = serde_json::to_value(TenantSource::AccessKey).unwrap();
        assert_eq!(json, "access_key");
        let json = serde_json::to_value(TenantSource::DomainDefault).unwrap();
        assert_eq!(json, "domain_default");
        let json = serde_json::to_value(TenantSource::AdminAssignment).unwrap();
        assert_eq!(json, "admin_assignment");
    }
}
