//! Cache key construction.

use sha2::{Digest, Sha256};

/// Digest for an analysis request.
///
/// The address is hashed verbatim: no case folding, no whitespace trimming.
/// `"Central Park"` and `"central park"` are distinct keys even though the
/// geocoder would resolve them identically.
pub fn request_key(address: &str, radius_m: u32, include_long_context: bool) -> String {
    digest(&format!("{}_{}_{}", address, radius_m, include_long_context))
}

/// Digest over a bare job id.
///
/// Used only by the opportunistic cache write on the result-poll path. Note
/// that this key is unrelated to the `request_key` the enqueue path reads,
/// so entries written under it are never served from the cache-first check.
pub fn job_key(job_id: &str) -> String {
    digest(job_id)
}

fn digest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// TESTS
// =============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Identical inputs always produce identical keys.
        #[test]
        fn prop_request_key_pure(
            address in ".{0,64}",
            radius in 0u32..100_000,
            flag in any::<bool>(),
        ) {
            let first = request_key(&address, radius, flag);
            let second = request_key(&address, radius, flag);
            prop_assert_eq!(first, second);
        }

        /// Changing the radius changes the key.
        #[test]
        fn prop_request_key_radius_sensitive(
            address in "[a-zA-Z0-9 ,]{1,40}",
            radius in 0u32..50_000,
            delta in 1u32..1000,
            flag in any::<bool>(),
        ) {
            let a = request_key(&address, radius, flag);
            let b = request_key(&address, radius + delta, flag);
            prop_assert_ne!(a, b);
        }

        /// Flipping the long-context flag changes the key.
        #[test]
        fn prop_request_key_flag_sensitive(
            address in "[a-zA-Z0-9 ,]{1,40}",
            radius in 0u32..50_000,
        ) {
            let with = request_key(&address, radius, true);
            let without = request_key(&address, radius, false);
            prop_assert_ne!(with, without);
        }
    }
}
