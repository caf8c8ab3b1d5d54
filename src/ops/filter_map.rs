//! Filter-map operator

use std::marker::PhantomData;
use std::sync::Arc;

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::BoxSubscription;

/// Applies a transform to every emission and forwards only the `Some`
/// results.
pub struct FilterMap<S, F, T> {
  source: S,
  transform: Arc<F>,
  _marker: PhantomData<fn(T)>,
}

impl<S, F, T> FilterMap<S, F, T> {
  pub(crate) fn new(source: S, transform: F) -> Self {
    Self {
      source,
      transform: Arc::new(transform),
      _marker: PhantomData,
    }
  }
}

impl<T, R, S, F> Observable<R> for FilterMap<S, F, T>
where
  T: Send + 'static,
  R: Send + 'static,
  S: Observable<T>,
  F: Fn(T) -> Option<R> + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<R>) -> BoxSubscription {
    self.source.subscribe_observer(Arc::new(FilterMapObserver {
      downstream: observer,
      transform: Arc::clone(&self.transform),
    }))
  }
}

struct FilterMapObserver<F, R> {
  downstream: ObserverRef<R>,
  transform: Arc<F>,
}

impl<T, R, F> Observer<T> for FilterMapObserver<F, R>
where
  T: Send + 'static,
  R: Send + 'static,
  F: Fn(T) -> Option<R> + Send + Sync + 'static,
{
  fn next(&self, value: T) {
    if let Some(mapped) = (self.transform)(value) {
      self.downstream.next(mapped);
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
  fn keeps_only_some_results() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    from_iter(vec!["1", "x", "3"])
      .filter_map(|v: &str| v.parse::<i32>().ok())
      .subscribe(move |v| sink.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
  }
}
