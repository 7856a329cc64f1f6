use derive_more::Display;

/// Identifies one outgoing request so its response can be matched back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("#{_0}")]
pub struct Ticket(u64);

/// Last-request-wins bookkeeping: each `issue` supersedes every earlier
/// ticket, and only the newest ticket is accepted back.
#[derive(Debug, Default)]
pub struct RequestTracker {
    issued: u64,
    in_flight: bool,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        self.in_flight = true;
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    /// Accepts a response; `false` means it was superseded and must be dropped.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) || !self.in_flight {
            return false;
        }
        self.in_flight = false;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight
    }
}
