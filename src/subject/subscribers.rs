//! Observer registry shared by the subject variants

use crate::observer::ObserverRef;

/// Ordered observer registry. Lives inside each subject's mutex; fan-out
/// snapshots it so removal during delivery cannot corrupt the iteration.
pub(crate) struct Subscribers<T> {
  entries: Vec<Entry<T>>,
  next_key: u64,
}

struct Entry<T> {
  key: u64,
  observer: ObserverRef<T>,
}

impl<T> Subscribers<T> {
  pub(crate) fn new() -> Self {
    Self {
      entries: Vec::new(),
      next_key: 0,
    }
  }

  pub(crate) fn add(&mut self, observer: ObserverRef<T>) -> u64 {
    let key = self.next_key;
    self.next_key += 1;
    self.entries.push(Entry { key, observer });
    key
  }

  pub(crate) fn remove(&mut self, key: u64) {
    self.entries.retain(|entry| entry.key != key);
  }

  pub(crate) fn snapshot(&self) -> Vec<ObserverRef<T>> {
    self
      .entries
      .iter()
      .map(|entry| entry.observer.clone())
      .collect()
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }
}
