//! Transactional document store for key records and the redemption ledger.
//!
//! The store is an explicit repository interface: services never see the
//! underlying database, only [`KeyStore`] and the transactional view
//! [`StoreTx`]. Write-conflict detection and retry is a property of the
//! implementation, never of service logic, so a transaction body must be
//! free of external side effects (no claim writes, no network calls) and
//! safe to re-execute.

pub mod memory;
pub mod records;

pub use memory::MemoryStore;
pub use records::{redemption_doc_id, AccessKeyRecord, RedemptionRecord};

use crate::TenantPassError;

/// Transactional view over the key collection and redemption ledger.
///
/// Reads observe pending writes made earlier in the same transaction.
/// Writes are buffered and commit atomically when the transaction body
/// returns `Ok`; nothing commits when it returns `Err`.
pub trait StoreTx {
    /// Read a key record by hash.
    fn get_key(&self, key_hash: &str) -> Result<Option<AccessKeyRecord>, TenantPassError>;

    /// Buffer a key record write (insert or overwrite).
    fn put_key(&mut self, record: AccessKeyRecord);

    /// All currently-active key records for a tenant.
    fn active_keys_for_tenant(
        &self,
        tenant_id: &str,
    ) -> Result<Vec<AccessKeyRecord>, TenantPassError>;

    /// Read the ledger entry for a (key, user) pair.
    fn get_redemption(
        &self,
        key_hash: &str,
        user_id: &str,
    ) -> Result<Option<RedemptionRecord>, TenantPassError>;

    /// Buffer a ledger entry write.
    fn put_redemption(&mut self, record: RedemptionRecord);
}

/// Repository over the key collection and redemption ledger.
///
/// Not object-safe (the transaction body is generic); services are generic
/// over their store instead of holding a trait object.
pub trait KeyStore: Send + Sync {
    /// Run `body` as one atomic, serializable transaction scoped to the
    /// documents it reads and writes.
    fn with_transaction<T, F>(&self, body: F) -> Result<T, TenantPassError>
    where
        F: FnOnce(&mut dyn StoreTx) -> Result<T, TenantPassError>;

    /// Read a key record outside any transaction.
    fn get_key(&self, key_hash: &str) -> Result<Option<AccessKeyRecord>, TenantPassError>;

    /// The most recently created key records, newest first, at most `limit`.
    fn recent_keys(&self, limit: usize) -> Result<Vec<AccessKeyRecord>, TenantPassError>;

    /// Every key record, for read-only aggregation.
    fn all_keys(&self) -> Result<Vec<AccessKeyRecord>, TenantPassError>;

    /// Read a ledger entry outside any transaction.
    fn get_redemption(
        &self,
        key_hash: &str,
        user_id: &str,
    ) -> Result<Option<RedemptionRecord>, TenantPassError>;
}
