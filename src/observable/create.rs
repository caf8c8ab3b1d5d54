//! Custom sources built from subscription handlers

use std::sync::Arc;

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, Subscription, TeardownSubscription};

/// Builds an observable from a handler that runs once per subscription.
///
/// The handler receives the downstream observer and returns the teardown for
/// whatever production it started (a callback registration, a timer, a
/// subject subscription).
pub fn create<T, F>(on_subscribe: F) -> Create<F>
where
  T: Send + 'static,
  F: Fn(ObserverRef<T>) -> BoxSubscription + Send + Sync + 'static,
{
  Create { on_subscribe }
}

pub struct Create<F> {
  on_subscribe: F,
}

impl<T, F> Observable<T> for Create<F>
where
  T: Send + 'static,
  F: Fn(ObserverRef<T>) -> BoxSubscription + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    (self.on_subscribe)(observer)
  }
}

/// Like [`create`], but for production blocks with nothing of their own to
/// tear down. The block receives an emit-only observer; the synthesized
/// subscription gates it, so emissions after disposal are dropped.
pub fn callback<T, F>(block: F) -> Callback<F>
where
  T: Send + 'static,
  F: Fn(ObserverRef<T>) + Send + Sync + 'static,
{
  Callback { block }
}

pub struct Callback<F> {
  block: F,
}

impl<T, F> Observable<T> for Callback<F>
where
  T: Send + 'static,
  F: Fn(ObserverRef<T>) + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    let gate = TeardownSubscription::empty();
    let gated: ObserverRef<T> = Arc::new(GatedObserver {
      downstream: observer,
      gate: gate.clone(),
    });
    (self.block)(gated);
    gate.boxed()
  }
}

struct GatedObserver<T> {
  downstream: ObserverRef<T>,
  gate: TeardownSubscription,
}

impl<T: Send + 'static> Observer<T> for GatedObserver<T> {
  fn next(&self, value: T) {
    if !self.gate.is_closed() {
      self.downstream.next(value);
    }
  }

  fn complete(&self) {
    if !self.gate.is_closed() {
      self.downstream.complete();
    }
  }
}
