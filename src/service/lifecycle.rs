//! Access-key management: create, list, revoke, rotate, cap updates.
//!
//! Every operation requires administrator privilege and stamps the acting
//! administrator into the record's audit fields. All timestamps are
//! server-assigned from the injected clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::clock::Clock;
use crate::codec;
use crate::identity::claims::Caller;
use crate::policy::access;
use crate::store::{AccessKeyRecord, KeyStore};
use crate::TenantPassError;

/// How many keys `list` returns at most.
const LIST_LIMIT: usize = 100;

/// Inputs for issuing a key, shared by `create` and `rotate`.
#[derive(Debug, Clone, Copy)]
pub struct NewKeyParams<'a> {
    /// Tenant the key grants membership in.
    pub tenant_id: &'a str,

    /// Administrator-facing description of the key's purpose.
    pub label: &'a str,

    /// Optional RFC 3339 expiry timestamp.
    pub expires_at: Option<&'a str>,

    /// Optional cap on redemptions; must be positive when present.
    pub max_uses: Option<u64>,
}

/// A freshly issued key. The plaintext is returned exactly once and never
/// stored; only the hash can be used to refer to the key afterwards.
#[derive(Debug, Clone)]
pub struct IssuedKey {
    /// The shareable key string.
    pub plaintext: String,

    /// The key's storage identity.
    pub key_hash: String,
}

/// Result of a rotation: the replacement key plus how many previously
/// active keys it superseded.
#[derive(Debug, Clone)]
pub struct RotatedKey {
    /// The shareable replacement key string.
    pub plaintext: String,

    /// The replacement key's storage identity.
    pub key_hash: String,

    /// How many keys the rotation deactivated.
    pub revoked_count: usize,
}

/// Management operations over the key collection.
pub struct KeyLifecycleService<S: KeyStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: KeyStore> KeyLifecycleService<S> {
    /// Wire the service over a store and clock.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Mint and persist a new access key.
    ///
    /// # Errors
    /// - `Unauthenticated` / `PermissionDenied` - caller checks
    /// - `InvalidArgument` - bad tenant id, empty label, unparseable
    ///   expiry, or zero usage cap
    pub fn create(
        &self,
        caller: Option<&Caller>,
        params: &NewKeyParams<'_>,
    ) -> Result<IssuedKey, TenantPassError> {
        let admin = access::require_privileged(caller)?;
        let (record, plaintext) = self.mint_record(admin, params)?;
        let key_hash = record.key_hash.clone();

        self.store.with_transaction(move |tx| {
            tx.put_key(record);
            Ok(())
        })?;

        info!(
            tenant = params.tenant_id,
            key = codec::short_hash(&key_hash),
            "issued access key"
        );
        Ok(IssuedKey {
            plaintext,
            key_hash,
        })
    }

    /// The most recently created keys, newest first, plaintext never
    /// included (it is not stored).
    pub fn list(&self, caller: Option<&Caller>) -> Result<Vec<AccessKeyRecord>, TenantPassError> {
        access::require_privileged(caller)?;
        self.store.recent_keys(LIST_LIMIT)
    }

    /// Deactivate a key. Idempotent: revoking an already-revoked key is
    /// not an error.
    ///
    /// # Errors
    /// - `KeyNotFound` - no key exists for the hash
    pub fn revoke(&self, caller: Option<&Caller>, key_hash: &str) -> Result<(), TenantPassError> {
        let admin = access::require_privileged(caller)?;
        let admin_id = admin.user_id.clone();
        let now = self.clock.now_utc();

        self.store.with_transaction(|tx| {
            let mut record = tx.get_key(key_hash)?.ok_or(TenantPassError::KeyNotFound)?;
            if !record.is_active {
                return Ok(());
            }
            deactivate(&mut record, &admin_id, now, None);
            tx.put_key(record);
            Ok(())
        })?;

        info!(key = codec::short_hash(key_hash), "revoked access key");
        Ok(())
    }

    /// Replace every active key for a tenant with one new key, atomically.
    ///
    /// There is no observable instant where the old keys and the new key
    /// are simultaneously redeemable, or where the tenant has no key.
    pub fn rotate(
        &self,
        caller: Option<&Caller>,
        params: &NewKeyParams<'_>,
    ) -> Result<RotatedKey, TenantPassError> {
        let admin = access::require_privileged(caller)?;
        let admin_id = admin.user_id.clone();
        let (record, plaintext) = self.mint_record(admin, params)?;
        let key_hash = record.key_hash.clone();
        let now = record.created_at;

        let revoked_count = self.store.with_transaction(|tx| {
            let active = tx.active_keys_for_tenant(params.tenant_id)?;
            let count = active.len();
            for mut old in active {
                deactivate(&mut old, &admin_id, now, Some(record.key_hash.clone()));
                tx.put_key(old);
            }
            tx.put_key(record);
            Ok(count)
        })?;

        info!(
            tenant = params.tenant_id,
            key = codec::short_hash(&key_hash),
            revoked_count,
            "rotated access keys"
        );
        Ok(RotatedKey {
            plaintext,
            key_hash,
            revoked_count,
        })
    }

    /// Set or clear the usage cap on an existing key.
    ///
    /// Lowering the cap below the current use count is allowed; the key
    /// simply behaves as exhausted from then on.
    ///
    /// # Errors
    /// - `KeyNotFound` - no key exists for the hash
    /// - `InvalidArgument` - a zero cap
    pub fn update_max_uses(
        &self,
        caller: Option<&Caller>,
        key_hash: &str,
        max_uses: Option<u64>,
    ) -> Result<(), TenantPassError> {
        let admin = access::require_privileged(caller)?;
        if max_uses == Some(0) {
            return Err(TenantPassError::InvalidArgument(
                "usage cap must be a positive integer".to_string(),
            ));
        }
        let admin_id = admin.user_id.clone();
        let now = self.clock.now_utc();

        self.store.with_transaction(|tx| {
            let mut record = tx.get_key(key_hash)?.ok_or(TenantPassError::KeyNotFound)?;
            record.max_uses = max_uses;
            record.updated_at = Some(now);
            record.updated_by = Some(admin_id.clone());
            tx.put_key(record);
            Ok(())
        })?;

        info!(
            key = codec::short_hash(key_hash),
            cap = ?max_uses,
            "updated access key usage cap"
        );
        Ok(())
    }

    /// Validate params and build a fresh record plus its plaintext.
    fn mint_record(
        &self,
        admin: &Caller,
        params: &NewKeyParams<'_>,
    ) -> Result<(AccessKeyRecord, String), TenantPassError> {
        codec::validate_tenant_id(params.tenant_id)?;

        if params.label.trim().is_empty() {
            return Err(TenantPassError::InvalidArgument(
                "label is required".to_string(),
            ));
        }

        let expires_at = params
            .expires_at
            .map(parse_expiry)
            .transpose()?;

        if params.max_uses == Some(0) {
            return Err(TenantPassError::InvalidArgument(
                "usage cap must be a positive integer".to_string(),
            ));
        }

        let plaintext = codec::generate(params.tenant_id, self.clock.as_ref());
        let key_hash = codec::hash(&codec::normalize(&plaintext));

        let record = AccessKeyRecord {
            key_hash,
            tenant_id: params.tenant_id.to_string(),
            label: params.label.to_string(),
            created_by: admin.user_id.clone(),
            created_at: self.clock.now_utc(),
            expires_at,
            max_uses: params.max_uses,
            uses: 0,
            is_active: true,
            revoked_at: None,
            revoked_by: None,
            rotation_replaced_by: None,
            updated_at: None,
            updated_by: None,
        };
        Ok((record, plaintext))
    }
}

/// Stamp a record as deactivated, with the replacement hash when the
/// deactivation came from rotation.
fn deactivate(
    record: &mut AccessKeyRecord,
    admin_id: &str,
    now: DateTime<Utc>,
    replaced_by: Option<String>,
) {
    record.is_active = false;
    record.revoked_at = Some(now);
    record.revoked_by = Some(admin_id.to_string());
    record.rotation_replaced_by = replaced_by;
    record.updated_at = Some(now);
    record.updated_by = Some(admin_id.to_string());
}

/// Parse an RFC 3339 expiry string.
fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, TenantPassError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TenantPassError::InvalidArgument(format!("unparseable expiry: {}", e)))
}
