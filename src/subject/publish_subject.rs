//! Subject without buffering

use std::sync::{Arc, Mutex};

use super::subscribers::Subscribers;
use super::Subject;
use crate::observable::{Observable, ObservableRef};
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, TeardownSubscription};

/// Multicasts values to the observers subscribed at emission time. Late
/// subscribers receive nothing that was emitted before they attached.
pub struct PublishSubject<T> {
  subscribers: Arc<Mutex<Subscribers<T>>>,
}

impl<T> PublishSubject<T> {
  pub fn new() -> Self {
    Self {
      subscribers: Arc::new(Mutex::new(Subscribers::new())),
    }
  }
}

impl<T> Default for PublishSubject<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Clone for PublishSubject<T> {
  fn clone(&self) -> Self {
    Self {
      subscribers: Arc::clone(&self.subscribers),
    }
  }
}

impl<T: Send + 'static> Observable<T> for PublishSubject<T> {
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    let key = self.subscribers.lock().unwrap().add(observer);
    let subscribers = Arc::clone(&self.subscribers);
    TeardownSubscription::new(move || subscribers.lock().unwrap().remove(key)).boxed()
  }
}

impl<T: Clone + Send + 'static> Observer<T> for PublishSubject<T> {
  fn next(&self, value: T) {
    let snapshot = self.subscribers.lock().unwrap().snapshot();
    for observer in snapshot {
      observer.next(value.clone());
    }
  }

  fn complete(&self) {
    let snapshot = self.subscribers.lock().unwrap().snapshot();
    for observer in snapshot {
      observer.complete();
    }
  }
}

impl<T: Clone + Send + 'static> Subject<T> for PublishSubject<T> {
  fn count(&self) -> usize {
    self.subscribers.lock().unwrap().len()
  }

  fn as_observable(&self) -> ObservableRef<T> {
    Arc::new(self.clone())
  }
}
