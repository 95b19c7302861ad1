//! Per-tenant reporting over the key and profile collections.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::identity::claims::Caller;
use crate::identity::profile::ProfileStore;
use crate::policy::access;
use crate::store::KeyStore;
use crate::TenantPassError;

/// One tenant's row in the billing overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantOverview {
    /// The tenant.
    pub tenant_id: String,

    /// Users currently assigned to the tenant.
    pub user_count: u64,

    /// Keys still active for the tenant.
    pub active_keys: u64,

    /// All keys ever issued for the tenant, active or not.
    pub total_keys: u64,
}

/// Read-only aggregator over the key store and profile store.
pub struct BillingOverviewReader<S: KeyStore> {
    store: Arc<S>,
    profiles: Arc<dyn ProfileStore>,
}

impl<S: KeyStore> BillingOverviewReader<S> {
    /// Wire the reader over its two collections.
    pub fn new(store: Arc<S>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { store, profiles }
    }

    /// Per-tenant user and key counts, sorted by user count descending
    /// (ties broken by tenant id for a stable order).
    pub fn overview(
        &self,
        caller: Option<&Caller>,
    ) -> Result<Vec<TenantOverview>, TenantPassError> {
        access::require_privileged(caller)?;

        fn row<'a>(
            rows: &'a mut BTreeMap<String, TenantOverview>,
            tenant_id: &str,
        ) -> &'a mut TenantOverview {
            rows.entry(tenant_id.to_string())
                .or_insert_with(|| TenantOverview {
                    tenant_id: tenant_id.to_string(),
                    user_count: 0,
                    active_keys: 0,
                    total_keys: 0,
                })
        }

        let mut rows: BTreeMap<String, TenantOverview> = BTreeMap::new();

        for key in self.store.all_keys()? {
            let entry = row(&mut rows, &key.tenant_id);
            entry.total_keys += 1;
            if key.is_active {
                entry.active_keys += 1;
            }
        }

        for profile in self.profiles.all_profiles()? {
            if let Some(tenant_id) = &profile.tenant_id {
                row(&mut rows, tenant_id).user_count += 1;
            }
        }

        let mut overview: Vec<TenantOverview> = rows.into_values().collect();
        overview.sort_by(|a, b| {
            b.user_count
                .cmp(&a.user_count)
                .then_with(|| a.tenant_id.cmp(&b.tenant_id))
        });
        Ok(overview)
    }
}
