use dashmap::DashSet;

/// Concurrency-safe set of keys that have already produced a diagnostic.
///
/// `first_seen` is an atomic check-and-insert: among any number of concurrent
/// callers passing the same key, exactly one observes `true`.
#[derive(Debug, Default)]
pub struct WarnOnce {
    seen: DashSet<String>
}

impl WarnOnce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_seen(&self, key: &str) -> bool {
        if self.seen.contains(key) {
            return false;
        }
        self.seen.insert(key.to_string())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Forgets every key. Only tests should need this.
    pub fn reset(&self) {
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_first_seen_once() {
        let warned = WarnOnce::new();
        assert!(warned.first_seen("unknown"));
        assert!(!warned.first_seen("unknown"));
        assert!(warned.first_seen("other"));
        assert_eq!(warned.len(), 2);
    }

    #[test]
    fn test_reset_forgets_keys() {
        let warned = WarnOnce::new();
        warned.first_seen("unknown");
        warned.reset();
        assert!(warned.is_empty());
        assert!(warned.first_seen("unknown"));
    }

    #[test]
    fn test_concurrent_first_seen_has_single_winner() {
        let warned = Arc::new(WarnOnce::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let warned = Arc::clone(&warned);
                let winners = Arc::clone(&winners);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        if warned.first_seen("contended") {
                            winners.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
    }
}
