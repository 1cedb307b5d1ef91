//! Request tickets so only the latest fetch settles a view

use std::sync::atomic::{AtomicU64, Ordering};

/// Handle for one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Tracks which request is allowed to settle a view
///
/// Each `issue` supersedes every earlier ticket. A view applies a result only
/// when `accepts` its ticket, so a slow response to an old filter or page
/// never overwrites a newer one.
#[derive(Debug, Default)]
pub struct QueryObserver {
    latest: AtomicU64,
}

impl QueryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn accepts(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Invalidates every outstanding ticket
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}
