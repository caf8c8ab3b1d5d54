//! Start-with operator

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::BoxSubscription;

/// Emits a fixed prefix of values to each new subscriber before the source
/// is subscribed.
pub struct StartWith<S, T> {
  source: S,
  items: Vec<T>,
}

impl<S, T> StartWith<S, T> {
  pub(crate) fn new(source: S, items: Vec<T>) -> Self {
    Self { source, items }
  }
}

impl<T, S> Observable<T> for StartWith<S, T>
where
  T: Clone + Send + Sync + 'static,
  S: Observable<T>,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    for value in self.items.iter().cloned() {
      observer.next(value);
    }
    self.source.subscribe_observer(observer)
  }
}
