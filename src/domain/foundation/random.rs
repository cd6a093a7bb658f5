//! Random source seam for uniform sampling.
//!
//! The synthesizer and provider gateway both sample uniformly (professions,
//! random persona picks, canned fallback phrases). Injecting the source keeps
//! those code paths deterministic in tests.

use std::fmt;

/// Source of uniform random indices.
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..len`. `len` of zero returns zero.
    fn pick_index(&self, len: usize) -> usize;

    /// Picks a uniformly random element from a slice.
    fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        if items.is_empty() {
            None
        } else {
            items.get(self.pick_index(items.len()))
        }
    }
}

impl RandomSource for std::sync::Arc<dyn RandomSource> {
    fn pick_index(&self, len: usize) -> usize {
        self.as_ref().pick_index(len)
    }
}

/// Production random source backed by uuid v4 entropy (122 random bits
/// per draw), so no extra RNG dependency is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidEntropy;

impl RandomSource for UuidEntropy {
    fn pick_index(&self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        // Modulo bias is negligible for the small sets sampled here.
        (uuid::Uuid::new_v4().as_u128() % len as u128) as usize
    }
}

/// Deterministic source for tests: always returns the configured index
/// (clamped to the slice).
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub usize);

impl RandomSource for FixedRandom {
    fn pick_index(&self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.0.min(len - 1)
        }
    }
}

impl fmt::Display for FixedRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedRandom({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_entropy_stays_in_bounds() {
        let source = UuidEntropy;
        for _ in 0..100 {
            assert!(source.pick_index(7) < 7);
        }
    }

    #[test]
    fn uuid_entropy_zero_len_returns_zero() {
        assert_eq!(UuidEntropy.pick_index(0), 0);
    }

    #[test]
    fn fixed_random_clamps_to_slice() {
        let source = FixedRandom(10);
        assert_eq!(source.pick_index(3), 2);
        assert_eq!(source.pick_index(0), 0);
    }

    #[test]
    fn pick_returns_element_from_slice() {
        let items = ["a", "b", "c"];
        let picked = FixedRandom(1).pick(&items).unwrap();
        assert_eq!(*picked, "b");
    }

    #[test]
    fn pick_on_empty_slice_is_none() {
        let items: [&str; 0] = [];
        assert!(UuidEntropy.pick(&items).is_none());
    }
}
