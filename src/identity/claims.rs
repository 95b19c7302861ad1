//! Claim sets and the pure tenant-assignment merge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The claim set attached to a user's identity token.
///
/// Identity providers treat claims as one atomic blob, so any write must
/// carry the full set. Claims this crate doesn't interpret are preserved
/// verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSet {
    /// The user's current tenant assignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    /// Tenant-administrator privilege.
    #[serde(default)]
    pub admin: bool,

    /// Platform-administrator privilege.
    #[serde(default)]
    pub super_admin: bool,

    /// Provider claims this crate passes through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ClaimSet {
    /// Whether this claim set carries administrator privilege.
    pub fn is_privileged(&self) -> bool {
        self.admin || self.super_admin
    }
}

/// A caller identity as attached by the surrounding request layer.
#[derive(Debug, Clone)]
pub struct Caller {
    /// The identity-provider user id.
    pub user_id: String,

    /// The caller's claim set.
    pub claims: ClaimSet,
}

impl Caller {
    /// Construct a caller from its user id and claims.
    pub fn new(user_id: impl Into<String>, claims: ClaimSet) -> Self {
        Self {
            user_id: user_id.into(),
            claims,
        }
    }
}

/// Return a claim set equal to `claims` with only the tenant field changed.
///
/// A naive overwrite of the claim blob would silently revoke unrelated
/// privileges (notably `admin`/`super_admin`); this merge is the only way
/// the crate ever writes claims.
pub fn assign_tenant(claims: &ClaimSet, tenant_id: &str) -> ClaimSet {
    let mut next = claims.clone();
    next.tenant_id = Some(tenant_id.to_string());
    next
}
