//! Subject with a bounded replay cache

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::subscribers::Subscribers;
use super::Subject;
use crate::observable::{Observable, ObservableRef};
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, TeardownSubscription};

/// Subject that retains up to `capacity` past emissions and replays them,
/// oldest first, to every new subscriber before live delivery begins.
///
/// A negative capacity retains everything; zero disables replay entirely.
pub struct ReplaySubject<T> {
  inner: Arc<Mutex<ReplayInner<T>>>,
}

struct ReplayInner<T> {
  cache: VecDeque<T>,
  capacity: usize,
  subscribers: Subscribers<T>,
}

impl<T> ReplaySubject<T> {
  pub fn new(capacity: isize) -> Self {
    Self {
      inner: Arc::new(Mutex::new(ReplayInner {
        cache: VecDeque::new(),
        capacity: normalize(capacity),
        subscribers: Subscribers::new(),
      })),
    }
  }

  /// Retains everything ever emitted.
  pub fn unbounded() -> Self {
    Self::new(-1)
  }

  /// Drop all cached history. Does not affect anything already delivered.
  pub fn clear(&self) {
    self.inner.lock().unwrap().cache.clear();
  }

  /// Change the cache capacity. Shrinking drops the oldest entries; growing
  /// retains every existing entry.
  pub fn resize(&self, capacity: isize) {
    let mut inner = self.inner.lock().unwrap();
    let capacity = normalize(capacity);
    while inner.cache.len() > capacity {
      inner.cache.pop_front();
    }
    inner.capacity = capacity;
  }
}

impl<T: Clone> ReplaySubject<T> {
  /// The most recently cached value, if any.
  pub fn last(&self) -> Option<T> {
    self.inner.lock().unwrap().cache.back().cloned()
  }
}

fn normalize(capacity: isize) -> usize {
  if capacity < 0 {
    usize::MAX
  } else {
    capacity as usize
  }
}

impl<T> Clone for ReplaySubject<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<T: Clone + Send + 'static> Observable<T> for ReplaySubject<T> {
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    let (key, replay) = {
      let mut inner = self.inner.lock().unwrap();
      let replay: Vec<T> = inner.cache.iter().cloned().collect();
      (inner.subscribers.add(observer.clone()), replay)
    };
    for value in replay {
      observer.next(value);
    }

    let shared = Arc::clone(&self.inner);
    TeardownSubscription::new(move || shared.lock().unwrap().subscribers.remove(key)).boxed()
  }
}

impl<T: Clone + Send + 'static> Observer<T> for ReplaySubject<T> {
  fn next(&self, value: T) {
    let snapshot = {
      let mut inner = self.inner.lock().unwrap();
      if inner.capacity > 0 {
        if inner.cache.len() >= inner.capacity {
          inner.cache.pop_front();
        }
        inner.cache.push_back(value.clone());
      }
      inner.subscribers.snapshot()
    };
    for observer in snapshot {
      observer.next(value.clone());
    }
  }

  fn complete(&self) {
    let snapshot = self.inner.lock().unwrap().subscribers.snapshot();
    for observer in snapshot {
      observer.complete();
    }
  }
}

impl<T: Clone + Send + 'static> Subject<T> for ReplaySubject<T> {
  fn count(&self) -> usize {
    self.inner.lock().unwrap().subscribers.len()
  }

  fn as_observable(&self) -> ObservableRef<T> {
    Arc::new(self.clone())
  }
}
