//! Authorization predicates for management and redemption endpoints.

pub mod access;

pub use access::{require_authenticated, require_privileged};
