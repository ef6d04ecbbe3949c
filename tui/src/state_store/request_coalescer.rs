use std::{collections::HashMap, hash::Hash};

/// Keeps at most one request per key in flight.
///
/// A request for a key that is already in flight is not started. Instead the
/// in-flight one is flagged, and when it finishes the caller is told to issue
/// a single follow-up, however many requests were folded into it.
#[derive(Debug)]
pub struct RequestCoalescer<K> {
    /// In-flight keys, with whether a follow-up was asked for
    in_flight: HashMap<K, bool>,
}

impl<K> Default for RequestCoalescer<K> {
    fn default() -> Self {
        RequestCoalescer {
            in_flight: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq> RequestCoalescer<K> {
    /// Returns true when the caller should start the request now.
    pub fn begin(&mut self, key: K) -> bool {
        match self.in_flight.get_mut(&key) {
            Some(follow_up) => {
                *follow_up = true;
                false
            }
            None => {
                self.in_flight.insert(key, false);
                true
            }
        }
    }

    /// Marks the request as done. Returns true when a follow-up was asked for while it ran.
    pub fn finish(&mut self, key: &K) -> bool {
        self.in_flight.remove(key).unwrap_or(false)
    }

    #[cfg(test)]
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.in_flight.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_in_flight_are_coalesced_into_one_follow_up() {
        let mut coalescer = RequestCoalescer::default();

        assert!(coalescer.begin("messages"));
        assert!(!coalescer.begin("messages"));
        assert!(!coalescer.begin("messages"));
        assert!(coalescer.is_in_flight(&"messages"));

        assert!(coalescer.finish(&"messages"));
        assert!(!coalescer.is_in_flight(&"messages"));

        // the follow-up runs on its own
        assert!(coalescer.begin("messages"));
        assert!(!coalescer.finish(&"messages"));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut coalescer = RequestCoalescer::default();

        assert!(coalescer.begin("messages"));
        assert!(coalescer.begin("participants"));

        assert!(!coalescer.finish(&"participants"));
        assert!(coalescer.is_in_flight(&"messages"));
        assert!(!coalescer.finish(&"messages"));
    }

    #[test]
    fn test_finish_without_begin() {
        let mut coalescer: RequestCoalescer<&str> = RequestCoalescer::default();

        assert!(!coalescer.finish(&"messages"));
    }
}
