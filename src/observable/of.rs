//! Single-value source

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, TeardownSubscription};

/// Emits one value to each subscriber, then completes.
pub fn of<T: Clone + Send + Sync + 'static>(value: T) -> Of<T> {
  Of { value }
}

#[derive(Clone)]
pub struct Of<T> {
  value: T,
}

impl<T> Observable<T> for Of<T>
where
  T: Clone + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    observer.next(self.value.clone());
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
  fn emits_value_then_completes() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let completed = Arc::new(Mutex::new(false));
    let sink = seen.clone();
    let flag = completed.clone();

    let subscription = of(7).subscribe_complete(
      move |v| sink.lock().unwrap().push(v),
      move || *flag.lock().unwrap() = true,
    );

    assert_eq!(*seen.lock().unwrap(), vec![7]);
    assert!(*completed.lock().unwrap());
    assert!(subscription.is_closed());
  }

  #[test]
  fn reruns_per_subscriber() {
    let source = of("hi");
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));

    let sink = first.clone();
    source.subscribe(move |v| sink.lock().unwrap().push(v));
    let sink = second.clone();
    source.subscribe(move |v| sink.lock().unwrap().push(v));

    assert_eq!(*first.lock().unwrap(), vec!["hi"]);
    assert_eq!(*second.lock().unwrap(), vec!["hi"]);
  }
}
