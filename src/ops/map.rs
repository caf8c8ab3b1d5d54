//! Map operator

use std::marker::PhantomData;
use std::sync::Arc;

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::BoxSubscription;

/// Applies a transform to every emission before passing it downstream.
pub struct Map<S, F, T> {
  source: S,
  transform: Arc<F>,
  _marker: PhantomData<fn(T)>,
}

impl<S, F, T> Map<S, F, T> {
  pub(crate) fn new(source: S, transform: F) -> Self {
    Self {
      source,
      transform: Arc::new(transform),
      _marker: PhantomData,
    }
  }
}

impl<T, R, S, F> Observable<R> for Map<S, F, T>
where
  T: Send + 'static,
  R: Send + 'static,
  S: Observable<T>,
  F: Fn(T) -> R + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<R>) -> BoxSubscription {
    self.source.subscribe_observer(Arc::new(MapObserver {
      downstream: observer,
      transform: Arc::clone(&self.transform),
    }))
  }
}

struct MapObserver<F, R> {
  downstream: ObserverRef<R>,
  transform: Arc<F>,
}

impl<T, R, F> Observer<T> for MapObserver<F, R>
where
  T: Send + 'static,
  R: Send + 'static,
  F: Fn(T) -> R + Send + Sync + 'static,
{
  fn next(&self, value: T) {
    self.downstream.next((self.transform)(value));
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
  fn transforms_each_emission() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    from_iter(vec![1, 2, 3])
      .map(|v| v * 2)
      .subscribe(move |v| sink.lock().unwrap().push(v));
    assert_eq!(*seen.lock().unwrap(), vec![2, 4, 6]);
  }

  #[test]
  fn disposing_derived_detaches_from_source() {
    let subject = PublishSubject::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let subscription = subject
      .clone()
      .map(|v: i32| v + 10)
      .subscribe(move |v| sink.lock().unwrap().push(v));

    subject.next(1);
    assert_eq!(subject.count(), 1);

    subscription.unsubscribe();
    assert_eq!(subject.count(), 0);

    subject.next(2);
    assert_eq!(*seen.lock().unwrap(), vec![11]);
  }

  #[test]
  fn forwards_completion() {
    let completions = Arc::new(Mutex::new(0));
    let counter = completions.clone();
    from_iter(vec![1])
      .map(|v| v)
      .subscribe_complete(|_| {}, move || *counter.lock().unwrap() += 1);
    assert_eq!(*completions.lock().unwrap(), 1);
  }
}
