//! Query layer: caching, invalidation, notification and polling
//!
//! This module sits between services and pages:
//! - `QueryKey` / `QueryCache`: keyed results with staleness windows
//! - `run_query` / `run_mutation`: toasts and invalidation around calls
//! - `Notifier`: the toast queue
//! - `QueryObserver`: latest-request-wins for a view
//! - `Poller`: recurring reads on a background task

mod cache;
mod key;
mod mutation;
mod notify;
mod observer;
mod poll;

pub use cache::{QueryCache, QueryPolicy};
pub use key::QueryKey;
pub use mutation::{run_mutation, run_query, Mutation};
pub use notify::{Notifier, Toast, ToastLevel};
pub use observer::{QueryObserver, Ticket};
pub use poll::{PollCadence, PollOutcome, Poller};
