//! # Tenantpass
//!
//! **Tenant access-key issuance and one-time redemption for multi-tenant
//! platforms.**
//!
//! An administrator mints a shareable, human-typeable key that grants
//! membership in a tenant; a learner redeems it exactly once to receive a
//! tenant-scoped authorization claim. Only the SHA-256 hash of a key is
//! ever stored, and every redemption is decided inside one atomic store
//! transaction, so usage caps hold under arbitrary concurrency.
//!
//! ## Features
//!
//! - **Hash-only storage** — plaintext keys are returned once at issuance
//!   and can never be recovered, only rotated
//! - **Idempotent redemption** — a per-(key, user) ledger entry guards
//!   against double-counting; replays are harmless no-ops
//! - **Usage caps and expiry** — enforced atomically with the counter
//!   increment
//! - **Atomic rotation** — one batch deactivates every outstanding key for
//!   a tenant and installs its replacement
//! - **Claim-preserving assignment** — tenant writes merge into the
//!   provider claim blob without touching other privileges
//!
//! ## Quickstart
//!
//! ```
//! use tenantpass::{AccessManager, Caller, ClaimSet, NewKeyParams, TenantPassConfig};
//!
//! fn main() -> Result<(), tenantpass::TenantPassError> {
//!     let config = TenantPassConfig {
//!         default_tenant: "starter-academy",
//!         domain_tenants: &[("acme.edu", "acme-institute")],
//!     };
//!     let manager = AccessManager::in_memory(config)?;
//!
//!     let admin = Caller::new(
//!         "admin-1",
//!         ClaimSet {
//!             admin: true,
//!             ..ClaimSet::default()
//!         },
//!     );
//!     let issued = manager.create_key(
//!         Some(&admin),
//!         &NewKeyParams {
//!             tenant_id: "acme-institute",
//!             label: "fall cohort",
//!             expires_at: None,
//!             max_uses: Some(30),
//!         },
//!     )?;
//!
//!     let learner = Caller::new("learner-7", ClaimSet::default());
//!     let tenant = manager.redeem(Some(&learner), &issued.plaintext)?;
//!     assert_eq!(tenant, "acme-institute");
//!     Ok(())
//! }
//! ```
//!
//! ## Storage model
//!
//! Two logical collections share one transactional document store: key
//! records keyed by key hash, and redemption ledger entries keyed by
//! `{key_hash}_{user_id}`. User profiles are an external collaborator the
//! crate writes tenant assignments into but does not own. The store is an
//! explicit interface ([`store::KeyStore`]); the bundled
//! [`MemoryStore`](store::MemoryStore) backs tests and embedders, and any
//! transactional document database can implement it.
//!
//! ## Configuration
//!
//! - `default_tenant` — tenant for new accounts with unmapped domains
//! - `domain_tenants` — static email-domain to tenant table
//!
//! See [`TenantPassConfig`] for full documentation.

#![deny(warnings)]
#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod codec;
pub mod config;
pub mod errors;

// Identity layer
pub mod identity;

// Policy layer
pub mod policy;

// Storage layer
pub mod store;

// Service layer
pub mod service;

// Manager (main public API)
pub mod manager;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::TenantPassConfig;
pub use errors::TenantPassError;
pub use identity::{Caller, ClaimSet, TenantSource};
pub use manager::AccessManager;
pub use service::{IssuedKey, NewKeyParams, RotatedKey, TenantOverview};
pub use store::{AccessKeyRecord, MemoryStore, RedemptionRecord};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
