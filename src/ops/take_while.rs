//! Take-while operator

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, Subscription, SubscriptionSlot};

/// Forwards emissions while the predicate holds.
///
/// On the first failing value the subscription tears itself down, both the
/// derived and the source subscription, with no external dispose call. In
/// inclusive mode that failing value is forwarded once first; otherwise it
/// is dropped.
pub struct TakeWhile<S, F> {
  source: S,
  predicate: Arc<F>,
  inclusive: bool,
}

impl<S, F> TakeWhile<S, F> {
  pub(crate) fn new(source: S, predicate: F, inclusive: bool) -> Self {
    Self {
      source,
      predicate: Arc::new(predicate),
      inclusive,
    }
  }
}

impl<T, S, F> Observable<T> for TakeWhile<S, F>
where
  T: Send + 'static,
  S: Observable<T>,
  F: Fn(&T) -> bool + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    let slot = SubscriptionSlot::new();
    let subscription = self.source.subscribe_observer(Arc::new(TakeWhileObserver {
      downstream: observer,
      predicate: Arc::clone(&self.predicate),
      inclusive: self.inclusive,
      done: AtomicBool::new(false),
      slot: slot.clone(),
    }));
    slot.fill(subscription);
    slot.boxed()
  }
}

struct TakeWhileObserver<F, T> {
  downstream: ObserverRef<T>,
  predicate: Arc<F>,
  inclusive: bool,
  done: AtomicBool,
  slot: SubscriptionSlot,
}

impl<T, F> Observer<T> for TakeWhileObserver<F, T>
where
  T: Send + 'static,
  F: Fn(&T) -> bool + Send + Sync + 'static,
{
  fn next(&self, value: T) {
    if self.done.load(Ordering::Acquire) {
      return;
    }
    if (self.predicate)(&value) {
      self.downstream.next(value);
      return;
    }

    if self.done.swap(true, Ordering::AcqRel) {
      return;
    }
    if self.inclusive {
      self.downstream.next(value);
    }
    self.slot.unsubscribe();
    self.downstream.complete();
  }

  fn complete(&self) {
    if !self.done.swap(true, Ordering::AcqRel) {
      self.downstream.complete();
    }
  }
}
