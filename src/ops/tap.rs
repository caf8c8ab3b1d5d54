//! Tap operator

use std::sync::Arc;

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::BoxSubscription;

/// Runs a callback for each emission, then forwards the original value
/// unchanged.
pub struct Tap<S, F> {
  source: S,
  callback: Arc<F>,
}

impl<S, F> Tap<S, F> {
  pub(crate) fn new(source: S, callback: F) -> Self {
    Self {
      source,
      callback: Arc::new(callback),
    }
  }
}

impl<T, S, F> Observable<T> for Tap<S, F>
where
  T: Send + 'static,
  S: Observable<T>,
  F: Fn(&T) + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    self.source.subscribe_observer(Arc::new(TapObserver {
      downstream: observer,
      callback: Arc::clone(&self.callback),
    }))
  }
}

struct TapObserver<F, T> {
  downstream: ObserverRef<T>,
  callback: Arc<F>,
}

impl<T, F> Observer<T> for TapObserver<F, T>
where
  T: Send + 'static,
  F: Fn(&T) + Send + Sync + 'static,
{
  fn next(&self, value: T) {
    (self.callback)(&value);
    self.downstream.next(value);
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
  fn callback_runs_before_forwarding() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let tapped = log.clone();
    let received = log.clone();
    from_iter(vec![1, 2])
      .tap(move |v| tapped.lock().unwrap().push(format!("tap {v}")))
      .subscribe(move |v| received.lock().unwrap().push(format!("next {v}")));

    assert_eq!(
      *log.lock().unwrap(),
      vec!["tap 1", "next 1", "tap 2", "next 2"]
    );
  }
}
