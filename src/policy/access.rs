//! Caller authorization checks.
//!
//! Two tiers: any signed-in identity may attempt redemption, while every
//! management endpoint requires administrator privilege from the caller's
//! claim set.

use crate::identity::claims::Caller;
use crate::TenantPassError;

/// Require that a caller identity is attached to the request.
///
/// # Returns
/// * `Ok(&Caller)` - The authenticated caller
/// * `Err(Unauthenticated)` - No caller identity attached
pub fn require_authenticated(caller: Option<&Caller>) -> Result<&Caller, TenantPassError> {
    caller.ok_or(TenantPassError::Unauthenticated)
}

/// Require an administrator caller.
///
/// # Returns
/// * `Ok(&Caller)` - The privileged caller
/// * `Err(Unauthenticated)` - No caller identity attached
/// * `Err(PermissionDenied)` - Claims carry neither `admin` nor `superAdmin`
pub fn require_privileged(caller: Option<&Caller>) -> Result<&Caller, TenantPassError> {
    let caller = require_authenticated(caller)?;
    if caller.claims.is_privileged() {
        Ok(caller)
    } else {
        Err(TenantPassError::PermissionDenied)
    }
}
