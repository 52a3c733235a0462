//! Run-wide registry of generated cases

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Content digest of a case
pub type CaseDigest = [u8; 32];

/// Set of case digests seen during a run, each with its sequential id.
///
/// Check and insert happen under one lock, so two identical cases racing
/// from different threads still yield exactly one id.
#[derive(Debug, Default)]
pub struct CaseRegistry {
    seen: Mutex<FxHashMap<CaseDigest, usize>>,
}

impl CaseRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a case. Returns its id, or `None` if an identical case was
    /// registered before.
    pub fn register(&self, function: &str, values: &BTreeMap<String, String>) -> Option<usize> {
        let digest = case_digest(function, values);
        let mut seen = self.seen.lock();
        if seen.contains_key(&digest) {
            return None;
        }
        let id = seen.len() + 1;
        seen.insert(digest, id);
        Some(id)
    }

    /// Number of distinct cases registered
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    /// True when no case was registered yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// SHA-256 over the function name and the value table in key order,
/// fields separated by NUL bytes. Parameter text does not take part.
pub fn case_digest(function: &str, values: &BTreeMap<String, String>) -> CaseDigest {
    let mut hasher = Sha256::new();
    hasher.update(function.as_bytes());
    for (symbol, literal) in values {
        hasher.update([0u8]);
        hasher.update(symbol.as_bytes());
        hasher.update([0u8]);
        hasher.update(literal.as_bytes());
    }
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_sequential_ids() {
        let registry = CaseRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.register("foo", &values(&[("x", "1")])), Some(1));
        assert_eq!(registry.register("foo", &values(&[("x", "2")])), Some(2));
        assert_eq!(registry.register("bar", &values(&[("x", "1")])), Some(3));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_rejected() {
        let registry = CaseRegistry::new();
        let table = values(&[("reg_$0", "5"), ("reg_$1", "0x1A")]);
        assert_eq!(registry.register("foo", &table), Some(1));
        assert_eq!(registry.register("foo", &table.clone()), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_digest_fields_do_not_run_together() {
        let a = case_digest("foo", &values(&[("ab", "c")]));
        let b = case_digest("foo", &values(&[("a", "bc")]));
        let c = case_digest("fooa", &values(&[("b", "c")]));
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_concurrent_identical_cases() {
        let registry = Arc::new(CaseRegistry::new());
        let table = values(&[("reg_$0", "7")]);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let table = table.clone();
                thread::spawn(move || registry.register("foo", &table))
            })
            .collect();

        let accepted: Vec<usize> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(accepted, vec![1]);
        assert_eq!(registry.len(), 1);
    }
}
