//! With-state operator

use crate::observable::{Observable, ObservableState};
use crate::observer::ObserverRef;
use crate::subscription::BoxSubscription;

/// Attaches a current-value view to an observable that is not itself backed
/// by state.
///
/// Reading [`value`](ObservableState::value) defers to the provider;
/// subscribing forwards untouched to the underlying source, and the
/// provider is never invoked eagerly at subscribe time.
pub struct WithState<S, F> {
  source: S,
  provider: F,
}

impl<S, F> WithState<S, F> {
  pub(crate) fn new(source: S, provider: F) -> Self {
    Self { source, provider }
  }
}

impl<T, S, F> Observable<T> for WithState<S, F>
where
  T: Send + 'static,
  S: Observable<T>,
  F: Fn() -> T + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    self.source.subscribe_observer(observer)
  }
}

impl<T, S, F> ObservableState<T> for WithState<S, F>
where
  T: Send + 'static,
  S: Observable<T>,
  F: Fn() -> T + Send + Sync + 'static,
{
  fn value(&self) -> T {
    (self.provider)()
  }
}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn value_defers_to_the_provider() {
    let backing = Arc::new(Mutex::new(10));
    let subject: PublishSubject<i32> = PublishSubject::new();

    let reader = backing.clone();
    let stateful = subject.clone().with_state(move || *reader.lock().unwrap());

    assert_eq!(stateful.value(), 10);
    *backing.lock().unwrap() = 11;
    assert_eq!(stateful.value(), 11);
  }

  #[test]
  fn provider_is_not_invoked_by_subscribing() {
    let calls = Arc::new(Mutex::new(0));
    let subject: PublishSubject<i32> = PublishSubject::new();

    let counter = calls.clone();
    let stateful = subject.clone().with_state(move || {
      *counter.lock().unwrap() += 1;
      0
    });

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    stateful.subscribe(move |v| sink.lock().unwrap().push(v));

    assert_eq!(*calls.lock().unwrap(), 0);
    subject.next(5);
    assert_eq!(*seen.lock().unwrap(), vec![5]);
  }
}
