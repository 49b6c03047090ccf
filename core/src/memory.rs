//! In-memory backend. Clones share one table, so a test can keep a handle
//! and look at what the store wrote.

use crate::error::{StoreError, StoreResult};
use crate::model::{RepairTicket, TicketId};
use crate::store::{Snapshot, TicketBackend};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    snapshot: Snapshot,
    corrupt: Option<String>,
    fail_saves: bool,
    saves: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self { Self::default() }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        let b = Self::default();
        b.lock().snapshot = snapshot;
        b
    }

    /// A backend whose next load fails as corrupt.
    pub fn corrupt(reason: &str) -> Self {
        let b = Self::default();
        b.lock().corrupt = Some(reason.to_string());
        b
    }

    /// Make the next load fail as corrupt while keeping the stored counter.
    pub fn make_corrupt(&self, reason: &str) { self.lock().corrupt = Some(reason.to_string()); }

    pub fn fail_saves(&self, on: bool) { self.lock().fail_saves = on; }

    pub fn snapshot(&self) -> Snapshot { self.lock().snapshot.clone() }

    pub fn save_count(&self) -> usize { self.lock().saves }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TicketBackend for MemoryBackend {
    fn load(&mut self) -> StoreResult<Snapshot> {
        let st = self.lock();
        match &st.corrupt {
            Some(reason) => Err(StoreError::Corrupt(reason.clone())),
            None => Ok(st.snapshot.clone()),
        }
    }

    fn save(&mut self, last_id: TicketId, tickets: &[RepairTicket]) -> StoreResult<()> {
        let mut st = self.lock();
        if st.fail_saves {
            return Err(StoreError::Backend("memory backend refused the write".into()));
        }
        st.snapshot = Snapshot { last_id, tickets: tickets.to_vec() };
        st.saves += 1;
        Ok(())
    }

    fn quarantine(&mut self) -> StoreResult<Option<String>> {
        let mut st = self.lock();
        if st.corrupt.take().is_some() {
            return Ok(Some("memory (quarantined)".into()));
        }
        Ok(None)
    }

    fn last_known_id(&mut self) -> Option<TicketId> {
        Some(self.lock().snapshot.last_id).filter(|id| *id > 0)
    }

    fn location(&self) -> String { "memory".into() }
}
