//! Run Slot
//!
//! One slot per render target. Starting a run cancels whatever run the
//! slot held before, so two runs never render into the same place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Token of the active run plus its generation number
#[derive(Debug, Clone)]
pub struct RunTicket {
    pub generation: u64,
    pub token: CancellationToken,
}

#[derive(Debug, Default)]
pub struct RunSlot {
    current: Mutex<Option<CancellationToken>>,
    generation: AtomicU64,
}

impl RunSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the previous run, if any, and issue a token for a new one
    pub fn begin(&self) -> RunTicket {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.take() {
            previous.cancel();
        }
        let token = CancellationToken::new();
        *current = Some(token.clone());
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Run slot advanced to generation {}", generation);
        RunTicket { generation, token }
    }

    /// Cancel the active run without starting another
    pub fn cancel(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = current.take() {
            token.cancel();
        }
    }

    /// Whether `ticket` still belongs to the active run
    pub fn is_current(&self, ticket: &RunTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation && !ticket.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_cancels_previous() {
        let slot = RunSlot::new();
        let first = slot.begin();
        assert!(slot.is_current(&first));

        let second = slot.begin();
        assert!(first.token.is_cancelled());
        assert!(!slot.is_current(&first));
        assert!(slot.is_current(&second));
        assert_eq!(second.generation, first.generation + 1);
    }

    #[test]
    fn test_cancel_clears_slot() {
        let slot = RunSlot::new();
        let ticket = slot.begin();
        slot.cancel();
        assert!(ticket.token.is_cancelled());
        assert!(!slot.is_current(&ticket));
    }
}
