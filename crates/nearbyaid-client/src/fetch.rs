use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Orders overlapping fetches by when they were triggered.
///
/// Each trigger takes a ticket; a response may only be applied while its
/// ticket is still the newest one, so a slow reply to an older trigger can
/// never overwrite the result of a newer one.
#[derive(Debug, Clone, Default)]
pub struct FetchSequencer {
    latest: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch, superseding every earlier ticket.
    pub fn begin(&self) -> FetchTicket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        FetchTicket { generation }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.generation
    }
}
