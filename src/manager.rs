//! Access manager - the main public API for tenantpass.
//!
//! `AccessManager` wires the store, identity provider, profile store, and
//! clock together and exposes the full endpoint surface: key management
//! for administrators, redemption for learners, account-creation tenant
//! defaults, and the billing overview.

use std::sync::Arc;

use tracing::info;

use crate::clock::{Clock, SystemClock};
use crate::codec;
use crate::config::TenantPassConfig;
use crate::identity::claims::Caller;
use crate::identity::profile::{MemoryProfileStore, ProfileStore, TenantSource};
use crate::identity::provider::{IdentityProvider, MemoryIdentityProvider};
use crate::identity::resolver::TenantResolver;
use crate::identity::updater::ClaimsUpdater;
use crate::policy::access;
use crate::service::billing::{BillingOverviewReader, TenantOverview};
use crate::service::lifecycle::{IssuedKey, KeyLifecycleService, NewKeyParams, RotatedKey};
use crate::service::redeem::RedemptionService;
use crate::store::{AccessKeyRecord, KeyStore, MemoryStore};
use crate::TenantPassError;

/// Main access manager for tenantpass.
///
/// Create one instance per deployment and reuse it for all requests; the
/// services it wires are stateless, so the manager is shareable across
/// threads behind an `Arc`.
pub struct AccessManager<S: KeyStore> {
    config: TenantPassConfig,
    lifecycle: KeyLifecycleService<S>,
    redemption: RedemptionService<S>,
    billing: BillingOverviewReader<S>,
    updater: ClaimsUpdater,
    resolver: TenantResolver,
}

impl AccessManager<MemoryStore> {
    /// Create a manager over in-memory backends.
    ///
    /// Suitable for tests and local development; production deployments
    /// supply their own store, identity provider, and profile store via
    /// [`AccessManager::new`].
    pub fn in_memory(config: TenantPassConfig) -> Result<Self, TenantPassError> {
        Self::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryIdentityProvider::new()),
            Arc::new(MemoryProfileStore::new()),
        )
    }
}

impl<S: KeyStore> AccessManager<S> {
    /// Create a manager with the given configuration and backends.
    ///
    /// Uses the system clock for time operations.
    ///
    /// # Errors
    /// Returns an error if configuration validation fails.
    pub fn new(
        config: TenantPassConfig,
        store: Arc<S>,
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Result<Self, TenantPassError> {
        config.validate()?;
        Ok(Self::with_clock(
            config,
            store,
            provider,
            profiles,
            Arc::new(SystemClock),
        ))
    }

    /// Create a manager with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(
        config: TenantPassConfig,
        store: Arc<S>,
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TenantPassError> {
        config.validate()?;
        Ok(Self::with_clock(config, store, provider, profiles, clock))
    }

    fn with_clock(
        config: TenantPassConfig,
        store: Arc<S>,
        provider: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let updater = ClaimsUpdater::new(provider, profiles.clone(), clock.clone());
        let resolver = TenantResolver::from_config(&config);
        Self {
            lifecycle: KeyLifecycleService::new(store.clone(), clock.clone()),
            redemption: RedemptionService::new(store.clone(), updater.clone(), clock),
            billing: BillingOverviewReader::new(store, profiles),
            updater,
            resolver,
            config,
        }
    }

    /// Mint a new access key. Privileged.
    ///
    /// The plaintext in the result is shown to the administrator exactly
    /// once and cannot be recovered afterwards, only rotated.
    pub fn create_key(
        &self,
        caller: Option<&Caller>,
        params: &NewKeyParams<'_>,
    ) -> Result<IssuedKey, TenantPassError> {
        self.lifecycle.create(caller, params)
    }

    /// List the 100 most recently created keys, newest first. Privileged.
    pub fn list_keys(
        &self,
        caller: Option<&Caller>,
    ) -> Result<Vec<AccessKeyRecord>, TenantPassError> {
        self.lifecycle.list(caller)
    }

    /// Deactivate a key. Privileged; idempotent.
    pub fn revoke_key(
        &self,
        caller: Option<&Caller>,
        key_hash: &str,
    ) -> Result<(), TenantPassError> {
        self.lifecycle.revoke(caller, key_hash)
    }

    /// Replace every active key for a tenant with one new key. Privileged.
    pub fn rotate_keys(
        &self,
        caller: Option<&Caller>,
        params: &NewKeyParams<'_>,
    ) -> Result<RotatedKey, TenantPassError> {
        self.lifecycle.rotate(caller, params)
    }

    /// Set or clear a key's usage cap. Privileged.
    pub fn update_max_uses(
        &self,
        caller: Option<&Caller>,
        key_hash: &str,
        max_uses: Option<u64>,
    ) -> Result<(), TenantPassError> {
        self.lifecycle.update_max_uses(caller, key_hash, max_uses)
    }

    /// Redeem a submitted key for the calling user. Any authenticated
    /// caller; returns the granted tenant.
    pub fn redeem(
        &self,
        caller: Option<&Caller>,
        raw_key: &str,
    ) -> Result<String, TenantPassError> {
        self.redemption.redeem(caller, raw_key)
    }

    /// Per-tenant user and key counts. Privileged.
    pub fn billing_overview(
        &self,
        caller: Option<&Caller>,
    ) -> Result<Vec<TenantOverview>, TenantPassError> {
        self.billing.overview(caller)
    }

    /// Assign a user to a tenant directly. Privileged.
    pub fn assign_tenant_manual(
        &self,
        caller: Option<&Caller>,
        user_id: &str,
        tenant_id: &str,
    ) -> Result<(), TenantPassError> {
        let admin = access::require_privileged(caller)?;
        codec::validate_tenant_id(tenant_id)?;
        self.updater
            .assign(user_id, tenant_id, TenantSource::AdminAssignment)?;
        info!(
            admin = admin.user_id.as_str(),
            user = user_id,
            tenant = tenant_id,
            "manually assigned tenant"
        );
        Ok(())
    }

    /// Account-creation hook: assign the default tenant for the account's
    /// email domain. Called by the platform when a new account appears,
    /// before the user has had any chance to redeem a key.
    pub fn on_account_created(
        &self,
        user_id: &str,
        email: Option<&str>,
    ) -> Result<(), TenantPassError> {
        let tenant_id = self.resolver.resolve_default_tenant(email);
        self.updater
            .assign(user_id, tenant_id, TenantSource::DomainDefault)?;
        info!(user = user_id, tenant = tenant_id, "applied default tenant");
        Ok(())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &TenantPassConfig {
        &self.config
    }
}
