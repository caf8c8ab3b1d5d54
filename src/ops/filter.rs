//! Filter operator

use std::sync::Arc;

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::BoxSubscription;

/// Forwards only the emissions matching a predicate.
pub struct Filter<S, F> {
  source: S,
  predicate: Arc<F>,
}

impl<S, F> Filter<S, F> {
  pub(crate) fn new(source: S, predicate: F) -> Self {
    Self {
      source,
      predicate: Arc::new(predicate),
    }
  }
}

impl<T, S, F> Observable<T> for Filter<S, F>
where
  T: Send + 'static,
  S: Observable<T>,
  F: Fn(&T) -> bool + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    self.source.subscribe_observer(Arc::new(FilterObserver {
      downstream: observer,
      predicate: Arc::clone(&self.predicate),
    }))
  }
}

struct FilterObserver<F, T> {
  downstream: ObserverRef<T>,
  predicate: Arc<F>,
}

impl<T, F> Observer<T> for FilterObserver<F, T>
where
  T: Send + 'static,
  F: Fn(&T) -> bool + Send + Sync + 'static,
{
  fn next(&self, value: T) {
    if (self.predicate)(&value) {
      self.downstream.next(value);
    }
  }

  fn complete(&self) {
    self.downstream.complete();
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn drops_values_failing_the_predicate() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    from_iter(1..=6)
      .filter(|v| v % 2 == 0)
      .subscribe(move |v| sink.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![2, 4, 6]);
  }
}
