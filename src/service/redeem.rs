//! Key redemption: the one concurrency-sensitive path.
//!
//! Usage-limit enforcement and double-redemption prevention are decided
//! inside the same atomic transaction as the counter increment; otherwise
//! two redemptions racing each other (or racing an administrator's revoke)
//! could both succeed and double-count. The claim write happens strictly
//! after commit, outside the transaction, so a store-level retry never
//! re-executes an external side effect.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::codec;
use crate::identity::claims::Caller;
use crate::identity::profile::TenantSource;
use crate::identity::updater::ClaimsUpdater;
use crate::policy::access;
use crate::store::{KeyStore, RedemptionRecord};
use crate::TenantPassError;

/// Redeems submitted keys for tenant membership.
pub struct RedemptionService<S: KeyStore> {
    store: Arc<S>,
    claims: ClaimsUpdater,
    clock: Arc<dyn Clock>,
}

impl<S: KeyStore> RedemptionService<S> {
    /// Wire the service over a store, claims updater, and clock.
    pub fn new(store: Arc<S>, claims: ClaimsUpdater, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            claims,
            clock,
        }
    }

    /// Redeem a submitted key for the calling user.
    ///
    /// A user who has already redeemed this key gets the same tenant back
    /// as a no-op, regardless of what has happened to the key since; the
    /// ledger entry, not the key state, is the record of their membership
    /// grant. This also makes a retry after a failed claim write safe: the
    /// replay skips the precondition checks and the counter and simply
    /// re-attempts the claim assignment.
    ///
    /// # Errors
    /// - `Unauthenticated` - no caller identity
    /// - `InvalidArgument` - key empty after trimming
    /// - `KeyNotFound` - no key matches the submitted string
    /// - `KeyDisabled` - key revoked or superseded
    /// - `KeyExpired` - expiry in the past
    /// - `UsageExhausted` - usage cap reached
    /// - `Internal` - claim update failed after the redemption committed
    pub fn redeem(
        &self,
        caller: Option<&Caller>,
        raw_key: &str,
    ) -> Result<String, TenantPassError> {
        let caller = access::require_authenticated(caller)?;

        let normalized = codec::normalize(raw_key);
        if normalized.is_empty() {
            return Err(TenantPassError::InvalidArgument(
                "access key is required".to_string(),
            ));
        }
        let key_hash = codec::hash(&normalized);
        let now = self.clock.now_utc();
        let user_id = caller.user_id.clone();

        let tenant_id = self.store.with_transaction(|tx| {
            let mut record = tx.get_key(&key_hash)?.ok_or(TenantPassError::KeyNotFound)?;

            if let Some(existing) = tx.get_redemption(&key_hash, &user_id)? {
                // Already redeemed by this user: no writes, no checks.
                return Ok(existing.tenant_id);
            }

            if !record.is_active {
                return Err(TenantPassError::KeyDisabled);
            }
            if record.is_expired(now) {
                return Err(TenantPassError::KeyExpired);
            }
            if record.is_exhausted() {
                return Err(TenantPassError::UsageExhausted);
            }

            let tenant_id = record.tenant_id.clone();
            tx.put_redemption(RedemptionRecord {
                key_hash: key_hash.clone(),
                tenant_id: tenant_id.clone(),
                user_id: user_id.clone(),
                redeemed_at: now,
            });
            record.uses += 1;
            tx.put_key(record);
            Ok(tenant_id)
        })?;

        debug!(
            user = user_id.as_str(),
            tenant = tenant_id.as_str(),
            key = codec::short_hash(&key_hash),
            "redemption committed"
        );

        // Best-effort follow-up: the ledger and counter are the source of
        // truth for "was this key consumed", so a failure here is surfaced
        // but never rolls the redemption back.
        if let Err(err) = self
            .claims
            .assign(&user_id, &tenant_id, TenantSource::AccessKey)
        {
            warn!(
                user = user_id.as_str(),
                tenant = tenant_id.as_str(),
                error = %err,
                "tenant claim update failed after redemption"
            );
            return Err(TenantPassError::Internal(format!(
                "tenant claim update failed after redemption: {}",
                err
            )));
        }

        Ok(tenant_id)
    }
}
