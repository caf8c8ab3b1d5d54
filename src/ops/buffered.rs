//! Buffered operator

use std::sync::{Arc, Mutex};

use crate::observable::Observable;
use crate::observer::{Observer, ObserverRef};
use crate::subscription::BoxSubscription;

/// Withholds the first `count` emissions; once the `count`-th arrives, all
/// withheld values are flushed downstream in arrival order. After the flush
/// the buffer stays out of the way and later emissions are forwarded
/// directly. Completion flushes whatever was withheld.
pub struct Buffered<S> {
  source: S,
  count: usize,
}

impl<S> Buffered<S> {
  pub(crate) fn new(source: S, count: usize) -> Self {
    Self { source, count }
  }
}

impl<T, S> Observable<T> for Buffered<S>
where
  T: Send + 'static,
  S: Observable<T>,
{
  fn subscribe_observer(&self, observer: ObserverRef<T>) -> BoxSubscription {
    self.source.subscribe_observer(Arc::new(BufferedObserver {
      downstream: observer,
      count: self.count,
      state: Mutex::new(BufferState {
        held: Vec::new(),
        flushed: self.count == 0,
      }),
    }))
  }
}

struct BufferState<T> {
  held: Vec<T>,
  flushed: bool,
}

struct BufferedObserver<T> {
  downstream: ObserverRef<T>,
  count: usize,
  state: Mutex<BufferState<T>>,
}

impl<T> BufferedObserver<T> {
  fn drain(&self) -> Vec<T> {
    let mut state = self.state.lock().unwrap();
    state.flushed = true;
    std::mem::take(&mut state.held)
  }
}

impl<T: Send + 'static> Observer<T> for BufferedObserver<T> {
  fn next(&self, value: T) {
    let mut state = self.state.lock().unwrap();
    if state.flushed {
      drop(state);
      self.downstream.next(value);
      return;
    }

    state.held.push(value);
    if state.held.len() < self.count {
      return;
    }

    state.flushed = true;
    let held = std::mem::take(&mut state.held);
    drop(state);
    for held_value in held {
      self.downstream.next(held_value);
    }
  }

  fn complete(&self) {
    for held_value in self.drain() {
      self.downstream.next(held_value);
    }
    self.downstream.complete();
  }
}
