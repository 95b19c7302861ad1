//! Tenantpass error types.

use thiserror::Error;

/// Errors that can occur during key management and redemption.
#[derive(Debug, Error)]
pub enum TenantPassError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// No caller identity is attached to the request.
    #[error("Caller is not authenticated")]
    Unauthenticated,

    /// Caller lacks administrator privilege.
    #[error("Caller lacks administrator privilege")]
    PermissionDenied,

    /// Request payload failed validation before any write was attempted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No access key exists for the supplied hash.
    #[error("Access key not found")]
    KeyNotFound,

    /// Key has been revoked or superseded by rotation.
    #[error("Access key is disabled")]
    KeyDisabled,

    /// Key expiry timestamp is in the past.
    #[error("Access key has expired")]
    KeyExpired,

    /// Redemption cap reached.
    #[error("Access key usage limit reached")]
    UsageExhausted,

    /// Underlying store or identity-provider failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
