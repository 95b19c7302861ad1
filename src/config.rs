//! Tenantpass configuration.

use crate::codec;
use crate::TenantPassError;

/// Configuration for tenant access-key issuance and redemption.
///
/// This struct carries the deployment-specific settings: which tenant new
/// accounts land in by default, and which email domains map to which
/// tenants.
#[derive(Debug, Clone)]
pub struct TenantPassConfig {
    /// Tenant assigned to new accounts whose email domain is unmapped
    /// (or whose email is absent).
    pub default_tenant: &'static str,

    /// Static email-domain to tenant table consulted at account creation.
    /// Domains are compared case-insensitively.
    pub domain_tenants: &'static [(&'static str, &'static str)],
}

impl TenantPassConfig {
    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), TenantPassError> {
        codec::validate_tenant_id(self.default_tenant)
            .map_err(|e| TenantPassError::ConfigError(format!("default_tenant: {}", e)))?;

        for (domain, tenant) in self.domain_tenants {
            if domain.is_empty() {
                return Err(TenantPassError::ConfigError(
                    "domain_tenants entry has an empty domain".to_string(),
                ));
            }
            codec::validate_tenant_id(tenant).map_err(|e| {
                TenantPassError::ConfigError(format!("domain_tenants[{}]: {}", domain, e))
            })?;
        }
        Ok(())
    }
}
