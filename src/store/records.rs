//! Document types for the key collection and the redemption ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored access key.
///
/// The document identity is the SHA-256 hash of the normalized plaintext;
/// the plaintext itself is never persisted. `tenant_id`, `created_by`, and
/// `created_at` are immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyRecord {
    /// Hash of the normalized plaintext; the storage identity.
    pub key_hash: String,

    /// Tenant this key grants membership in.
    pub tenant_id: String,

    /// Administrator-facing description of the key's purpose.
    pub label: String,

    /// Identity of the issuing administrator.
    pub created_by: String,

    /// Server-assigned creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Optional expiry. Once in the past the key behaves as expired for
    /// redemption even though `is_active` remains true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Optional cap on redemptions; absent means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u64>,

    /// Redemption counter, incremented exactly once per distinct user.
    pub uses: u64,

    /// False once revoked or superseded by rotation. Terminal.
    pub is_active: bool,

    /// When the key was deactivated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,

    /// Who deactivated the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_by: Option<String>,

    /// Hash of the replacement key when deactivation came from rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_replaced_by: Option<String>,

    /// Timestamp of the last mutating management operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Administrator behind the last mutating management operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

impl AccessKeyRecord {
    /// Whether the key's expiry has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }

    /// Whether the usage cap has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|cap| self.uses >= cap)
    }
}

/// One redemption of one key by one user.
///
/// The document identity is the `{key_hash}_{user_id}` composite, which is
/// the idempotence guard: at most one record exists per pair, and it is
/// never deleted or overwritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    /// Hash of the redeemed key.
    pub key_hash: String,

    /// Tenant granted by the redemption.
    pub tenant_id: String,

    /// The redeeming user.
    pub user_id: String,

    /// Server-assigned redemption timestamp.
    pub redeemed_at: DateTime<Utc>,
}

/// Compose the ledger document id for a (key, user) pair.
pub fn redemption_doc_id(key_hash: &str, user_id: &str) -> String {
    format!("{}_{}", key_hash, user_id)
}
