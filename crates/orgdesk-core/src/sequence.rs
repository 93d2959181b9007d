//! Latest-request-wins sequencing for overlapping fetches.
//!
//! Every fetch into a given slot of UI state takes a [`Ticket`] before it is
//! sent. When the response arrives it is applied only if no newer ticket has
//! been issued for the same slot since, so a slow reply to an old request
//! cannot overwrite the result of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one request issued through a [`RequestSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Issues monotonically increasing [`Ticket`]s for one slot of state.
#[derive(Debug, Default)]
pub struct RequestSequence {
  latest: AtomicU64,
}

impl RequestSequence {
  pub fn new() -> Self { Self::default() }

  /// Take a ticket for a request about to be sent. Invalidates every ticket
  /// issued before it.
  pub fn issue(&self) -> Ticket {
    Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
  }

  /// Whether `ticket` is still the newest one issued.
  pub fn is_current(&self, ticket: Ticket) -> bool {
    self.latest.load(Ordering::Acquire) == ticket.0
  }

  /// Invalidate every outstanding ticket without issuing a new request, e.g.
  /// when the selection that prompted them is cleared.
  pub fn invalidate(&self) { self.latest.fetch_add(1, Ordering::AcqRel); }
}
