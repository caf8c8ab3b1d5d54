//! Distinct-until-changed operator

use std::sync::{Arc, Mutex};

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::BoxSubscription;

/// Suppresses emissions considered equal to their immediate predecessor.
pub struct DistinctUntilChanged<S, F> {
  source: S,
  eq: Arc<F>,
}

impl<S, F> DistinctUntilChanged<S, F> {
  pub(crate) fn new(source: S, eq: F) -> Self {
    Self {
      source,
      eq: Arc::new(eq),
    }
  }
}

impl<T, S, F> Observable<T> for DistinctUntilChanged<S, F>
where
  T: Clone + Send + 'static,
  S: Observable<T>,
  F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    self.source.subscribe_observer(Arc::new(DistinctObserver {
      downstream: observer,
      eq: Arc::clone(&self.eq),
      previous: Mutex::new(None),
    }))
  }
}

struct DistinctObserver<F, T> {
  downstream: ObserverRef<T>,
  eq: Arc<F>,
  previous: Mutex<Option<T>>,
}

impl<T, F> Observer<T> for DistinctObserver<F, T>
where
  T: Clone + Send + 'static,
  F: Fn(&T, &T) -> bool + Send + Sync + 'static,
{
  fn next(&self, value: T) {
    {
      let mut previous = self.previous.lock().unwrap();
      if previous.as_ref().is_some_and(|prev| (self.eq)(prev, &value)) {
        return;
      }
      *previous = Some(value.clone());
    }
    self.downstream.next(value);
  }

  fn complete(&self) {
    self.downstream.complete();
  }
}
