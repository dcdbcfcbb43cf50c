//! Generation tickets for discarding stale responses.
//!
//! A component bumps its generation whenever it starts a fetch or drops its
//! data; a response is applied only if it carries the current ticket.

/// Identifier handed out when a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic generation counter.
#[derive(Debug, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    /// Invalidate outstanding tickets and issue a new one.
    pub const fn next(&mut self) -> Ticket {
        self.current = self.current.wrapping_add(1);
        Ticket(self.current)
    }

    /// Invalidate outstanding tickets without issuing a new one.
    pub const fn invalidate(&mut self) {
        self.current = self.current.wrapping_add(1);
    }

    /// Whether `ticket` is still current.
    #[must_use]
    pub const fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.current
    }
}
