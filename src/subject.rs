//! Subjects: observables that can be published to
//!
//! A [`Subject`] is both an [`Observable`](crate::observable::Observable)
//! and an [`Observer`](crate::observer::Observer): values pushed into it via
//! `next` are multicast to every currently-subscribed observer, in
//! subscription order.
//!
//! Three variants cover the crate's needs and the set is closed:
//!
//! - [`PublishSubject`]: no buffering; late subscribers receive nothing
//!   emitted before they subscribed.
//! - [`StateSubject`]: holds a current value, delivered synchronously to
//!   every new subscriber before live emissions.
//! - [`ReplaySubject`]: retains a bounded history, replayed oldest-first to
//!   every new subscriber.
//!
//! Each subject guards its observer registry and variant state with a single
//! mutex. `next` updates state and snapshots the registry under that lock,
//! then delivers outside it, so observers may dispose themselves or others,
//! or publish re-entrantly, while a fan-out is in progress. The registry
//! mutates safely under concurrent subscribe/dispose; components that need a
//! strict emission order are expected to publish from one thread at a time.

mod publish_subject;
mod replay_subject;
mod state_subject;
mod subscribers;

pub use publish_subject::PublishSubject;
pub use replay_subject::ReplaySubject;
pub use state_subject::StateSubject;

use crate::observable::{Observable, ObservableRef};
use crate::observer::Observer;

/// An observable that can be published to.
pub trait Subject<T>: Observable<T> + Observer<T> {
  /// Number of currently-subscribed observers.
  fn count(&self) -> usize;

  /// A publish-restricted view of this subject.
  fn as_observable(&self) -> ObservableRef<T>;
}
