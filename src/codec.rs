//! Access-key generation, normalization, and hashing.
//!
//! Plaintext keys are human-typeable and visually traceable to their tenant:
//! `{tenant prefix}-{base-36 time suffix}-{random hex}`. Only the SHA-256
//! hash of the normalized plaintext is ever persisted; the plaintext is
//! returned to the issuing administrator exactly once.

use crate::clock::Clock;
use crate::TenantPassError;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Minimum tenant identifier length.
pub const TENANT_ID_MIN_LEN: usize = 2;

/// Maximum tenant identifier length.
pub const TENANT_ID_MAX_LEN: usize = 40;

/// How many leading tenant characters appear in a generated key.
const TENANT_PREFIX_LEN: usize = 6;

/// Length of the base-36 timestamp suffix in a generated key.
const TIME_SUFFIX_LEN: usize = 4;

/// Bytes of OS entropy in a generated key.
const ENTROPY_LEN: usize = 4;

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Validate a tenant identifier: lowercase alphanumeric plus hyphen,
/// 2-40 characters.
pub fn validate_tenant_id(tenant_id: &str) -> Result<(), TenantPassError> {
    let len = tenant_id.chars().count();
    if !(TENANT_ID_MIN_LEN..=TENANT_ID_MAX_LEN).contains(&len) {
        return Err(TenantPassError::InvalidArgument(format!(
            "tenant id must be {}-{} characters, got {}",
            TENANT_ID_MIN_LEN, TENANT_ID_MAX_LEN, len
        )));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-';
    if !tenant_id.chars().all(allowed) {
        return Err(TenantPassError::InvalidArgument(
            "tenant id may only contain lowercase letters, digits, and hyphens".to_string(),
        ));
    }
    Ok(())
}

/// Generate a plaintext access key for a tenant.
///
/// Format: `{first 6 chars of tenant, uppercased}-{last 4 base-36 digits of
/// the current unix second}-{4 random bytes, hex, uppercased}`. Weakly
/// collision-resistant; uniqueness is ultimately enforced by the hash
/// identity in the store.
pub fn generate(tenant_id: &str, clock: &dyn Clock) -> String {
    let prefix: String = tenant_id
        .chars()
        .take(TENANT_PREFIX_LEN)
        .collect::<String>()
        .to_uppercase();

    let stamp = time_suffix(clock.now_utc().timestamp());

    let mut entropy = [0u8; ENTROPY_LEN];
    rand::rngs::OsRng.fill_bytes(&mut entropy);

    format!("{}-{}-{}", prefix, stamp, hex::encode_upper(entropy))
}

/// Normalize a submitted key: strip all whitespace and uppercase.
///
/// Applied identically at issuance and at every redemption attempt so
/// copy/paste artifacts never cause false rejection.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Compute the SHA-256 hash of a normalized key as lowercase hex.
///
/// The hash is the key's storage identity; losing the plaintext means the
/// key must be rotated, not recovered.
pub fn hash(normalized: &str) -> String {
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

/// Truncate a key hash for log output.
///
/// Log lines carry enough of the hash to correlate with the store without
/// exposing the full lookup identity.
pub fn short_hash(key_hash: &str) -> &str {
    &key_hash[..16.min(key_hash.len())]
}

/// Last four base-36 digits of a unix second, most significant first.
fn time_suffix(unix_seconds: i64) -> String {
    let mut n = unix_seconds.max(0) as u64;
    let mut digits = [b'0'; TIME_SUFFIX_LEN];
    for slot in digits.iter_mut().rev() {
        *slot = BASE36[(n % 36) as usize];
        n /= 36;
    }
    String::from_utf8_lossy(&digits).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;

    #[test]
    fn test_validate_tenant_id_accepts_pattern() {
        assert!(validate_tenant_id("wisdom-warehouse").is_ok());
        assert!(validate_tenant_id("ab").is_ok());
        assert!(validate_tenant_id("tenant-42").is_ok());
    }

    #[test]
    fn test_validate_tenant_id_rejects_length() {
        assert!(matches!(
            validate_tenant_id("a"),
            Err(TenantPassError::InvalidArgument(_))
        ));
        let long = "a".repeat(41);
        assert!(matches!(
            validate_tenant_id(&long),
            Err(TenantPassError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_tenant_id_rejects_characters() {
        for bad in ["Wisdom", "acme_corp", "acme corp", "acmé", "a.b"] {
            assert!(
                matches!(
                    validate_tenant_id(bad),
                    Err(TenantPassError::InvalidArgument(_))
                ),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn test_generate_shape() {
        let clock = MockClock::from_rfc3339("2026-02-01T12:00:00Z");
        let key = generate("wisdom-warehouse", &clock);

        let parts: Vec<&str> = key.split('-').collect();
        // Tenant prefix itself contains a hyphen ("WISDOM" is the first six
        // chars here, so three segments total).
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "WISDOM");
        assert_eq!(parts[1].len(), 4);
        assert!(parts[1].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, key.to_uppercase());
    }

    #[test]
    fn test_generate_short_tenant_keeps_whole_name() {
        let clock = MockClock::from_rfc3339("2026-02-01T12:00:00Z");
        let key = generate("ab", &clock);
        assert!(key.starts_with("AB-"));
    }

    #[test]
    fn test_generate_entropy_varies() {
        let clock = MockClock::from_rfc3339("2026-02-01T12:00:00Z");
        let a = generate("demo-tenant", &clock);
        let b = generate("demo-tenant", &clock);
        // Same tenant and frozen clock; only the entropy segment differs.
        assert_ne!(a, b);
    }

    #[test]
    fn test_normalize_strips_whitespace_and_uppercases() {
        assert_eq!(normalize("  abc-123  "), "ABC-123");
        assert_eq!(normalize("abc - 1 2 3"), "ABC-123");
        assert_eq!(normalize("ABC-123"), "ABC-123");
        assert_eq!(normalize("a\tb\nc"), "ABC");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_normalization_equivalence_hashes() {
        let variants = [" abc-123 ", "ABC-123", "abc-123", "a b c - 1 2 3"];
        let hashes: Vec<String> = variants.iter().map(|v| hash(&normalize(v))).collect();
        assert!(hashes.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let digest = hash("ABC-123");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        // Deterministic
        assert_eq!(digest, hash("ABC-123"));
        assert_ne!(digest, hash("ABC-124"));
    }

    #[test]
    fn test_short_hash_truncates() {
        let digest = hash("ABC-123");
        assert_eq!(short_hash(&digest).len(), 16);
        assert_eq!(short_hash("abc"), "abc");
    }

    #[test]
    fn test_time_suffix_rolls_in_base36() {
        assert_eq!(time_suffix(0), "0000");
        assert_eq!(time_suffix(35), "000Z");
        assert_eq!(time_suffix(36), "0010");
        // Only the last four digits are kept.
        assert_eq!(time_suffix(36_i64.pow(4)), "0000");
        assert_eq!(time_suffix(36_i64.pow(4) + 1), "0001");
        assert_eq!(time_suffix(-5), "0000");
    }
}
