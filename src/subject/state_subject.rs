//! Subject holding a current value

use std::sync::{Arc, Mutex};

use super::subscribers::Subscribers;
use super::Subject;
use crate::observable::{Observable, ObservableRef, ObservableState};
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, TeardownSubscription};

/// Subject seeded with an initial value that always holds the latest
/// emission.
///
/// A pushed value becomes the current [`value`](StateSubject::value) before
/// it is delivered to any observer, and every new subscriber synchronously
/// receives the current value as its first emission.
pub struct StateSubject<T> {
  inner: Arc<Mutex<StateInner<T>>>,
}

struct StateInner<T> {
  value: T,
  subscribers: Subscribers<T>,
}

impl<T> StateSubject<T> {
  pub fn new(initial: T) -> Self {
    Self {
      inner: Arc::new(Mutex::new(StateInner {
        value: initial,
        subscribers: Subscribers::new(),
      })),
    }
  }
}

impl<T> Clone for StateSubject<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<T: Clone + Send + 'static> StateSubject<T> {
  /// A publish-restricted view that still exposes the current value.
  pub fn as_observable_state(&self) -> Arc<dyn ObservableState<T>> {
    Arc::new(self.clone())
  }
}

impl<T: Clone + Send + 'static> Observable<T> for StateSubject<T> {
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    let (key, current) = {
      let mut inner = self.inner.lock().unwrap();
      let current = inner.value.clone();
      (inner.subscribers.add(observer.clone()), current)
    };
    observer.next(current);

    let shared = Arc::clone(&self.inner);
    TeardownSubscription::new(move || shared.lock().unwrap().subscribers.remove(key)).boxed()
  }
}

impl<T: Clone + Send + 'static> Observer<T> for StateSubject<T> {
  fn next(&self, value: T) {
    let snapshot = {
      let mut inner = self.inner.lock().unwrap();
      inner.value = value.clone();
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

impl<T: Clone + Send + 'static> ObservableState<T> for StateSubject<T> {
  fn value(&self) -> T {
    self.inner.lock().unwrap().value.clone()
  }
}

impl<T: Clone + Send + 'static> Subject<T> for StateSubject<T> {
  fn count(&self) -> usize {
    self.inner.lock().unwrap().subscribers.len()
  }

  fn as_observable(&self) -> ObservableRef<T> {
    Arc::new(self.clone())
  }
}
