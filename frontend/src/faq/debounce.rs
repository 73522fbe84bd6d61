/// Identifies one scheduled request. Only the most recently issued ticket can
/// settle; every newer request or cancellation makes older tickets stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Last-write-wins holder for a debounced value.
///
/// The browser timer lives with the caller (dropping a
/// `gloo_timers::callback::Timeout` cancels it); this type decides which
/// timer callback is still allowed to apply its value.
#[derive(Debug)]
pub struct Debounced<T> {
    generation: u64,
    pending: Option<T>,
}

impl<T> Default for Debounced<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            pending: None,
        }
    }
}

impl<T> Debounced<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any pending value and returns the ticket for the new one.
    pub fn schedule(&mut self, value: T) -> Ticket {
        self.generation += 1;
        self.pending = Some(value);
        Ticket(self.generation)
    }

    /// Takes the pending value if `ticket` is still current.
    pub fn settle(&mut self, ticket: Ticket) -> Option<T> {
        if ticket.0 == self.generation {
            self.pending.take()
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }
}
