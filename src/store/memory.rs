//! In-memory store implementation.
//!
//! Backs tests and embedders that don't need persistence. Two ordered
//! collections behind a single `parking_lot::RwLock`; a transaction holds
//! the write lock for its whole body, so transactions are serialized and
//! the commit is trivially atomic. A database-backed implementation would
//! instead detect write conflicts and re-run the body, which is why bodies
//! must stay side-effect free.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::store::records::{redemption_doc_id, AccessKeyRecord, RedemptionRecord};
use crate::store::{KeyStore, StoreTx};
use crate::TenantPassError;

#[derive(Debug, Default)]
struct Collections {
    /// Key records by key hash.
    keys: BTreeMap<String, AccessKeyRecord>,
    /// Ledger entries by `{key_hash}_{user_id}`.
    redemptions: BTreeMap<String, RedemptionRecord>,
}

/// In-memory [`KeyStore`].
///
/// Cheaply cloneable; all clones share the same collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Transaction view with buffered writes and read-your-writes semantics.
struct MemoryTx<'a> {
    base: &'a Collections,
    pending_keys: BTreeMap<String, AccessKeyRecord>,
    pending_redemptions: BTreeMap<String, RedemptionRecord>,
}

impl StoreTx for MemoryTx<'_> {
    fn get_key(&self, key_hash: &str) -> Result<Option<AccessKeyRecord>, TenantPassError> {
        Ok(self
            .pending_keys
            .get(key_hash)
            .or_else(|| self.base.keys.get(key_hash))
            .cloned())
    }

    fn put_key(&mut self, record: AccessKeyRecord) {
        self.pending_keys.insert(record.key_hash.clone(), record);
    }

    fn active_keys_for_tenant(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<AccessKeyRecord>, TenantPassError> {
        let mut merged: BTreeMap<&str, &AccessKeyRecord> = self
            .base
            .keys
            .iter()
            .map(|(hash, record)| (hash.as_str(), record))
            .collect();
        for (hash, record) in &self.pending_keys {
            merged.insert(hash.as_str(), record);
        }

        Ok(merged
            .into_values()
            .filter(|record| record.is_active && record.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    fn get_redemption(
        &self,
        key_hash: &str,
        user_id: &str,
    ) -> Result<Option<RedemptionRecord>, TenantPassError> {
        let doc_id = redemption_doc_id(key_hash, user_id);
        Ok(self
            .pending_redemptions
            .get(&doc_id)
            .or_else(|| self.base.redemptions.get(&doc_id))
            .cloned())
    }

    fn put_redemption(&mut self, record: RedemptionRecord) {
        let doc_id = redemption_doc_id(&record.key_hash, &record.user_id);
        self.pending_redemptions.insert(doc_id, record);
    }
}

impl KeyStore for MemoryStore {
    fn with_transaction<T, F>(&self, body: F) -> Result<T, TenantPassError>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, TenantPassError>,
    {
        let mut guard = self.inner.write();
        let mut tx = MemoryTx {
            base: &*guard,
            pending_keys: BTreeMap::new(),
            pending_redemptions: BTreeMap::new(),
        };

        let out = body(&mut tx)?;

        let MemoryTx {
            pending_keys,
            pending_redemptions,
            ..
        } = tx;
        for (hash, record) in pending_keys {
            guard.keys.insert(hash, record);
        }
        for (doc_id, record) in pending_redemptions {
            guard.redemptions.insert(doc_id, record);
        }
        Ok(out)
    }

    fn get_key(&self, key_hash: &str) -> Result<Option<AccessKeyRecord>, TenantPassError> {
        Ok(self.inner.read().keys.get(key_hash).cloned())
    }

    fn recent_keys(&self, limit: usize) -> Result<Vec<AccessKeyRecord>, TenantPassError> {
        let mut keys: Vec<AccessKeyRecord> = self.inner.read().keys.values().cloned().collect();
        keys.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.key_hash.cmp(&b.key_hash))
        });
        keys.truncate(limit);
        Ok(keys)
    }

    fn all_keys(&self) -> Result<Vec<AccessKeyRecord>, TenantPassError> {
        Ok(self.inner.read().keys.values().cloned().collect())
    }

    fn get_redemption(
        &self,
        key_hash: &str,
        user_id: &str,
    ) -> Result<Option<RedemptionRecord>, TenantPassError> {
        let doc_id = redemption_doc_id(key_hash, user_id);
        Ok(self.inner.read().redemptions.get(&doc_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn key_record(hash: &str, tenant: &str, minute: u32) -> AccessKeyRecord {
        AccessKeyRecord {
            key_hash: hash.to_string(),
            tenant_id: tenant.to_string(),
            label: "test".to_string(),
            created_by: "admin-1".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 2, 1, 12, minute, 0).unwrap(),
            expires_at: None,
            max_uses: None,
            uses: 0,
            is_active: true,
            revoked_at: None,
            revoked_by: None,
            rotation_replaced_by: None,
            updated_at: None,
            updated_by: None,
        }
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let store = MemoryStore::new();
        store
            .with_transaction(|tx| {
                tx.put_key(key_record("hash-a", "demo", 0));
                Ok(())
            })
            .unwrap();

        assert!(store.get_key("hash-a").unwrap().is_some());
    }

    #[test]
    fn test_transaction_discards_on_err() {
        let store = MemoryStore::new();
        let result: Result<(), TenantPassError> = store.with_transaction(|tx| {
            tx.put_key(key_record("hash-a", "demo", 0));
            tx.put_redemption(RedemptionRecord {
                key_hash: "hash-a".to_string(),
                tenant_id: "demo".to_string(),
                user_id: "user-1".to_string(),
                redeemed_at: Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
            });
            Err(TenantPassError::KeyDisabled)
        });

        assert!(matches!(result, Err(TenantPassError::KeyDisabled)));
        assert!(store.get_key("hash-a").unwrap().is_none());
        assert!(store.get_redemption("hash-a", "user-1").unwrap().is_none());
    }

    #[test]
    fn test_transaction_reads_its_own_writes() {
        let store = MemoryStore::new();
        store
            .with_transaction(|tx| {
                assert!(tx.get_key("hash-a")?.is_none());
                tx.put_key(key_record("hash-a", "demo", 0));
                assert!(tx.get_key("hash-a")?.is_some());

                let mut record = tx.get_key("hash-a")?.unwrap();
                record.uses = 7;
                tx.put_key(record);
                assert_eq!(tx.get_key("hash-a")?.unwrap().uses, 7);
                Ok(())
            })
            .unwrap();

        assert_eq!(store.get_key("hash-a").unwrap().unwrap().uses, 7);
    }

    #[test]
    fn test_active_keys_sees_pending_deactivation() {
        let store = MemoryStore::new();
        store
            .with_transaction(|tx| {
                tx.put_key(key_record("hash-a", "demo", 0));
                tx.put_key(key_record("hash-b", "demo", 1));
                tx.put_key(key_record("hash-c", "other", 2));
                Ok(())
            })
            .unwrap();

        store
            .with_transaction(|tx| {
                let mut record = tx.get_key("hash-a")?.unwrap();
                record.is_active = false;
                tx.put_key(record);

                let active = tx.active_keys_for_tenant("demo")?;
                assert_eq!(active.len(), 1);
                assert_eq!(active[0].key_hash, "hash-b");
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_recent_keys_newest_first_with_limit() {
        let store = MemoryStore::new();
        store
            .with_transaction(|tx| {
                tx.put_key(key_record("hash-a", "demo", 0));
                tx.put_key(key_record("hash-b", "demo", 2));
                tx.put_key(key_record("hash-c", "demo", 1));
                Ok(())
            })
            .unwrap();

        let recent = store.recent_keys(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].key_hash, "hash-b");
        assert_eq!(recent[1].key_hash, "hash-c");
    }

    #[test]
    fn test_redemption_roundtrip() {
        let store = MemoryStore::new();
        let redeemed_at = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();
        store
            .with_transaction(|tx| {
                tx.put_redemption(RedemptionRecord {
                    key_hash: "hash-a".to_string(),
                    tenant_id: "demo".to_string(),
                    user_id: "user-1".to_string(),
                    redeemed_at,
                });
                Ok(())
            })
            .unwrap();

        let entry = store.get_redemption("hash-a", "user-1").unwrap().unwrap();
        assert_eq!(entry.tenant_id, "demo");
        assert_eq!(entry.redeemed_at, redeemed_at);
        assert!(store.get_redemption("hash-a", "user-2").unwrap().is_none());
    }
}
