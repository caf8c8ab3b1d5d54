//! Degenerate sources

use std::marker::PhantomData;

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, TeardownSubscription};

/// Emits nothing and completes immediately.
pub fn empty<T: Send + 'static>() -> Empty<T> {
  Empty {
    _marker: PhantomData,
  }
}

#[derive(Clone)]
pub struct Empty<T> {
  _marker: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> Observable<T> for Empty<T> {
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    observer.complete();
    TeardownSubscription::closed().boxed()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::observable::ObservableExt;
  use crate::subscription::Subscription;
  use std::sync::{Arc, Mutex};

  #[test]
  fn completes_without_values() {
    let completions = Arc::new(Mutex::new(0));
    let counter = completions.clone();
    let subscription = empty::<i32>()
      .subscribe_complete(|_| panic!("no values expected"), move || {
        *counter.lock().unwrap() += 1
      });

    assert_eq!(*completions.lock().unwrap(), 1);
    assert!(subscription.is_closed());
  }
}
