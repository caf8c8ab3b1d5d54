//! Observer trait and closure adapters
//!
//! An [`Observer`] is the consumer side of the push contract: it receives
//! values via `next` and an advisory end-of-cycle signal via `complete`.

use std::sync::Arc;

/// The consumer of data in the push-based pattern.
///
/// There is no error channel; failures are expected to be modelled by the
/// value type itself (for example a result-shaped payload). `complete` marks
/// the end of one subscription cycle. It is advisory rather than terminal:
/// hot sources such as subjects never call it on their own, while cold
/// sources call it once their production logic has run out of values.
///
/// Observers are shared between operator stages and subjects as
/// [`ObserverRef`], so implementations use interior mutability for any state
/// they keep.
pub trait Observer<T>: Send + Sync {
  /// Receive the next value pushed by the source.
  fn next(&self, value: T);

  /// The current subscription cycle has finished producing values.
  fn complete(&self) {}
}

/// Shared, type-erased observer handle.
pub type ObserverRef<T> = Arc<dyn Observer<T>>;

/// Adapts a pair of closures into an [`Observer`].
///
/// Used by the closure-based `subscribe` helpers. The `next` closure is
/// `Fn`, not `FnMut`: fan-out delivers through a shared reference, so any
/// captured state needs its own interior mutability.
pub struct ClosureObserver<F, C> {
  on_next: F,
  on_complete: C,
}

impl<F> ClosureObserver<F, fn()> {
  pub fn next_only(on_next: F) -> Self {
    Self { on_next, on_complete: noop }
  }
}

impl<F, C> ClosureObserver<F, C> {
  pub fn new(on_next: F, on_complete: C) -> Self {
    Self { on_next, on_complete }
  }
}

fn noop() {}

impl<T, F, C> Observer<T> for ClosureObserver<F, C>
where
  F: Fn(T) + Send + Sync,
  C: Fn() + Send + Sync,
{
  fn next(&self, value: T) {
    (self.on_next)(value);
  }

  fn complete(&self) {
    (self.on_complete)();
  }
}

impl<T, O> Observer<T> for Arc<O>
where
  O: Observer<T> + ?Sized,
{
  fn next(&self, value: T) {
    (**self).next(value);
  }

  fn complete(&self) {
    (**self).complete();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;

  #[test]
  fn closure_observer_forwards_next() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let observer = ClosureObserver::next_only(move |v: i32| sink.lock().unwrap().push(v));

    observer.next(1);
    observer.next(2);
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
  }

  #[test]
  fn closure_observer_signals_completion() {
    let completed = Arc::new(Mutex::new(0));
    let counter = completed.clone();
    let observer = ClosureObserver::new(|_: i32| {}, move || *counter.lock().unwrap() += 1);

    observer.complete();
    assert_eq!(*completed.lock().unwrap(), 1);
  }
}
