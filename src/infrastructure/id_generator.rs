// Sequential ID generator for the in-memory backend

use std::sync::atomic::{AtomicI64, Ordering};

/// Hands out strictly increasing positive IDs starting at 1.
/// A single atomic counter, so concurrent creates never observe the same value.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    last: AtomicI64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Generate the next unique ID
    pub fn next_id(&self) -> i64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_id_generation() {
        let generator = SequentialIdGenerator::new();

        let id1 = generator.next_id();
        let id2 = generator.next_id();
        let id3 = generator.next_id();

        assert_eq!((id1, id2, id3), (1, 2, 3));
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let generator = Arc::new(SequentialIdGenerator::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = generator.clone();
                std::thread::spawn(move || (0..500).map(|_| generator.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {}", id);
            }
        }
        assert_eq!(seen.len(), 4000);
        assert_eq!(generator.next_id(), 4001);
    }
}
