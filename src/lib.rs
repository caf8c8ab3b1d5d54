//! # rxkit: push-based reactive streams
//!
//! The concurrency backbone of a mobile analytics SDK: observable sources,
//! multicast subjects, composable operators, and pluggable schedulers.
//! Components communicate exclusively through these primitives: settings
//! propagation hands out a state-backed observable, lifecycle fan-out runs
//! through a replay subject, retry signalling through a publish subject.
//! Everything is torn down through a single composite subscription.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxkit::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let doubled = Arc::new(Mutex::new(Vec::new()));
//! let sink = doubled.clone();
//!
//! let subject = PublishSubject::new();
//! let subscription = subject
//!   .clone()
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(move |v| sink.lock().unwrap().push(v));
//!
//! subject.next(1);
//! subject.next(2);
//! assert_eq!(*doubled.lock().unwrap(), vec![4]);
//! subscription.unsubscribe();
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A source; `subscribe` yields a cancellable handle |
//! | [`Observer`] | A sink receiving `next` values and a `complete` signal |
//! | [`Subscription`] | Idempotent cancellation handle |
//! | [`Subject`] | Observable + observer, multicasting to its subscribers |
//! | [`Scheduler`] | Where and when a unit of work executes |
//!
//! Concurrency is opt-in: nothing here owns a thread until a caller routes
//! work through a [`Scheduler`], and disposal is the only cancellation
//! primitive, transitive and idempotent at every level.
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Subject`]: subject::Subject
//! [`Scheduler`]: scheduler::Scheduler

pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod subscription;

pub use prelude::*;
