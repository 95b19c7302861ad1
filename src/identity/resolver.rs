//! Default-tenant resolution from email domains.

use crate::config::TenantPassConfig;

/// Computes the default tenant for a newly created account.
///
/// Consulted once, at account creation; a user may later move tenants via
/// key redemption or manual assignment.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    domain_tenants: &'static [(&'static str, &'static str)],
    default_tenant: &'static str,
}

impl TenantResolver {
    /// Build a resolver from the configured domain table.
    pub fn from_config(config: &TenantPassConfig) -> Self {
        Self {
            domain_tenants: config.domain_tenants,
            default_tenant: config.default_tenant,
        }
    }

    /// The tenant for an account's email, or the default tenant when the
    /// email is absent, malformed, or its domain is unmapped.
    pub fn resolve_default_tenant(&self, email: Option<&str>) -> &'static str {
        let Some(domain) = email.and_then(|e| e.rsplit_once('@')).map(|(_, domain)| domain)
        else {
            return self.default_tenant;
        };

        self.domain_tenants
            .iter()
            .find(|(mapped, _)| mapped.eq_ignore_ascii_case(domain))
            .map(|(_, tenant)| *tenant)
            .unwrap_or(self.default_tenant)
    }
}
