//! N-ary combine-latest operator

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::{BoxSubscription, CompositeSubscription, TeardownSubscription};

/// Combines the latest values of several same-typed sources.
///
/// Nothing is emitted until every source has produced at least one value;
/// afterwards any single source emission re-invokes the combiner over the
/// current latest value of each source, presented in source-list order. An
/// empty source list emits `combiner(&[])` immediately upon subscribe, then
/// completes. The stream completes once every source has completed.
pub struct Combine<S, F, T> {
  sources: Vec<S>,
  combiner: Arc<F>,
  _marker: PhantomData<fn(T)>,
}

impl<S, F, T> Combine<S, F, T> {
  pub(crate) fn new(sources: Vec<S>, combiner: F) -> Self {
    Self {
      sources,
      combiner: Arc::new(combiner),
      _marker: PhantomData,
    }
  }
}

impl<T, R, S, F> Observable<R> for Combine<S, F, T>
where
  T: Clone + Send + 'static,
  R: Send + 'static,
  S: Observable<T>,
  F: Fn(&[T]) -> R + Send + Sync + 'static,
{
  fn subscribe_observer(&self, observer: ObserverRef<R>) -> BoxSubscription {
    if self.sources.is_empty() {
      observer.next((self.combiner)(&[]));
      observer.complete();
      return TeardownSubscription::closed().boxed();
    }

    let state = Arc::new(Mutex::new(CombineState {
      latest: (0..self.sources.len()).map(|_| None).collect(),
      completed: 0,
    }));

    let subscriptions = CompositeSubscription::new();
    for (index, source) in self.sources.iter().enumerate() {
      let slot_observer = Arc::new(SlotObserver {
        index,
        state: Arc::clone(&state),
        downstream: observer.clone(),
        combiner: Arc::clone(&self.combiner),
      });
      subscriptions.add_boxed(source.subscribe_observer(slot_observer));
    }
    subscriptions.boxed()
  }
}

struct CombineState<T> {
  latest: Vec<Option<T>>,
  completed: usize,
}

struct SlotObserver<F, T, R> {
  index: usize,
  state: Arc<Mutex<CombineState<T>>>,
  downstream: ObserverRef<R>,
  combiner: Arc<F>,
}

impl<T, R, F> Observer<T> for SlotObserver<F, T, R>
where
  T: Clone + Send + 'static,
  R: Send + 'static,
  F: Fn(&[T]) -> R + Send + Sync + 'static,
{
  fn next(&self, value: T) {
    let combined = {
      let mut state = self.state.lock().unwrap();
      state.latest[self.index] = Some(value);
      let values: Vec<T> = state.latest.iter().filter_map(Clone::clone).collect();
      if values.len() == state.latest.len() {
        Some((self.combiner)(&values))
      } else {
        None
      }
    };
    if let Some(combined) = combined {
      self.downstream.next(combined);
    }
  }

  fn complete(&self) {
    let all_done = {
      let mut state = self.state.lock().unwrap();
      state.completed += 1;
      state.completed == state.latest.len()
    };
    if all_done {
      self.downstream.complete();
    }
  }
}
