//! Iterable-backed source

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, Subscription, TeardownSubscription};

/// Emits every item of `iter` to each subscriber, oldest first, then
/// completes. The iterable is cloned per subscription, so the production
/// logic re-runs from scratch for every subscriber.
pub fn from_iter<I>(iter: I) -> FromIter<I>
where
  I: IntoIterator + Clone + Send + Sync + 'static,
{
  FromIter { iter }
}

#[derive(Clone)]
pub struct FromIter<I> {
  iter: I,
}

impl<T, I> Observable<T> for FromIter<I>
where
  T: Send + 'static,
  I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    let subscription = TeardownSubscription::empty();
    for value in self.iter.clone() {
      // A downstream stage may detach mid-iteration (e.g. take_while).
      if subscription.is_closed() {
        break;
      }
      observer.next(value);
    }
    if !subscription.is_closed() {
      observer.complete();
    }
    subscription.boxed()
  }
}
