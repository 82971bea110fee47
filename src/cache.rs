//! LRU cache for model-generated general answers.
//!
//! Answers are keyed by the trimmed request text. SQL results are never
//! cached; they reflect mutable database state.

use std::collections::{HashMap, VecDeque};

/// LRU cache built on a HashMap plus an access-order deque.
///
/// Most recently used keys sit at the front of the deque, eviction pops
/// from the back.
#[derive(Debug)]
pub struct AnswerCache {
    data: HashMap<String, String>,
    access_order: VecDeque<String>,
    max_size: usize,
}

impl AnswerCache {
    /// Default number of cached answers.
    pub const DEFAULT_CAPACITY: usize = 512;

    /// Creates a cache holding at most `max_size` entries.
    pub fn new(max_size: usize) -> Self {
        Self {
            data: HashMap::new(),
            access_order: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
        }
    }

    /// Returns the cached answer for `key`, promoting it to most recently
    /// used.
    pub fn get(&mut self, key: &str) -> Option<String> {
        if !self.data.contains_key(key) {
            return None;
        }
        self.access_order.retain(|k| k != key);
        self.access_order.push_front(key.to_string());
        self.data.get(key).cloned()
    }

    /// Stores an answer, evicting the least recently used entry when full.
    pub fn put(&mut self, key: String, value: String) {
        if self.max_size == 0 {
            return;
        }

        if self.data.contains_key(&key) {
            self.access_order.retain(|k| k != &key);
        } else if self.data.len() >= self.max_size {
            if let Some(lru_key) = self.access_order.pop_back() {
                self.data.remove(&lru_key);
            }
        }

        self.access_order.push_front(key.clone());
        self.data.insert(key, value);
    }

    /// Returns the number of cached answers.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for AnswerCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
