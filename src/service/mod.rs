//! Request-scoped services over the store and identity layers.

pub mod billing;
pub mod lifecycle;
pub mod redeem;

pub use billing::{BillingOverviewReader, TenantOverview};
pub use lifecycle::{IssuedKey, KeyLifecycleService, NewKeyParams, RotatedKey};
pub use redeem::RedemptionService;
