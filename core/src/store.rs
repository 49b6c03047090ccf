//! The ticket store: in-memory table mirrored to a backend on every write.

use crate::error::{StoreError, StoreResult};
use crate::gate::{AccessGate, OpenGate};
use crate::model::{today, NewTicket, RepairTicket, TicketId, TicketPatch, FIRST_TICKET_ID, MAX_TICKET_ID};
use crate::policy::IntakePolicy;
use crate::report::{summarize, FinancialReport};
use crate::search;
use std::collections::HashSet;
use time::Date;
use tracing::{debug, info, warn};

/// Everything a backend persists: the table plus the last id handed out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub last_id: TicketId,
    pub tickets: Vec<RepairTicket>,
}

/// Persistence strategy for the whole table.
pub trait TicketBackend {
    /// Read the table. Missing storage is an empty snapshot, not an error.
    fn load(&mut self) -> StoreResult<Snapshot>;

    /// Replace the stored table with `tickets`.
    fn save(&mut self, last_id: TicketId, tickets: &[RepairTicket]) -> StoreResult<()>;

    /// Move unreadable storage aside so a later save cannot overwrite it.
    /// Returns where it went.
    fn quarantine(&mut self) -> StoreResult<Option<String>> { Ok(None) }

    /// Counter that survives even when the table itself failed to load.
    /// Asked before [`TicketBackend::quarantine`].
    fn last_known_id(&mut self) -> Option<TicketId> { None }

    fn location(&self) -> String;
}

/// Why the store started empty instead of from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovery {
    pub reason: String,
    pub quarantined: Option<String>,
}

pub struct TicketStore {
    backend: Box<dyn TicketBackend>,
    tickets: Vec<RepairTicket>,
    last_id: TicketId,
    policy: IntakePolicy,
    gate: Box<dyn AccessGate>,
    clock: fn() -> Date,
    recovery: Option<Recovery>,
}

impl TicketStore {
    pub fn open(backend: impl TicketBackend + 'static) -> Self {
        Self::open_boxed(Box::new(backend))
    }

    /// Never fails: storage that cannot be read is quarantined and the
    /// store starts empty, with the cause kept in [`TicketStore::recovery`].
    pub fn open_boxed(mut backend: Box<dyn TicketBackend>) -> Self {
        let (snapshot, recovery) = match backend.load().and_then(normalize) {
            Ok(s) => (s, None),
            Err(e) => {
                let known = backend.last_known_id();
                let quarantined = backend.quarantine().unwrap_or_else(|qe| {
                    warn!(location = %backend.location(), error = %qe, "could not move unreadable table aside");
                    None
                });
                warn!(location = %backend.location(), error = %e, quarantined = ?quarantined, "ticket table unreadable, starting empty");
                // ids in the quarantined table stay reserved
                let last_id = known.unwrap_or(0).max(FIRST_TICKET_ID - 1);
                let empty = Snapshot { last_id, tickets: Vec::new() };
                (empty, Some(Recovery { reason: e.to_string(), quarantined }))
            }
        };
        debug!(location = %backend.location(), tickets = snapshot.tickets.len(), last_id = snapshot.last_id, "ticket table loaded");
        TicketStore {
            backend,
            tickets: snapshot.tickets,
            last_id: snapshot.last_id,
            policy: IntakePolicy::default(),
            gate: Box::new(OpenGate),
            clock: today,
            recovery,
        }
    }

    pub fn with_policy(mut self, policy: IntakePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_gate(mut self, gate: impl AccessGate + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    pub fn with_clock(mut self, clock: fn() -> Date) -> Self {
        self.clock = clock;
        self
    }

    pub fn recovery(&self) -> Option<&Recovery> { self.recovery.as_ref() }

    pub fn location(&self) -> String { self.backend.location() }

    pub fn last_id(&self) -> TicketId { self.last_id }

    pub fn scan(&self) -> &[RepairTicket] { &self.tickets }

    pub fn get(&self, id: TicketId) -> Option<&RepairTicket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn search(&self, query: &str) -> Vec<&RepairTicket> { search::search(&self.tickets, query) }

    pub fn report(&self) -> StoreResult<FinancialReport> { summarize(&self.tickets) }

    pub fn create(&mut self, intake: NewTicket) -> StoreResult<TicketId> {
        self.ensure_permitted()?;
        let id = self
            .last_id
            .checked_add(1)
            .filter(|id| *id <= MAX_TICKET_ID)
            .ok_or_else(|| StoreError::Overflow(format!("no ticket id after {}", self.last_id)))?;
        let ticket = intake.into_ticket(id, (self.clock)());
        self.policy.check(&ticket)?;
        let mut next = self.tickets.clone();
        next.push(ticket);
        self.commit(next, id)?;
        info!(id, "ticket created");
        Ok(id)
    }

    pub fn update(&mut self, id: TicketId, patch: &TicketPatch) -> StoreResult<RepairTicket> {
        self.ensure_permitted()?;
        let pos = self.position(id)?;
        let mut next = self.tickets.clone();
        patch.apply_to(&mut next[pos]);
        self.policy.check(&next[pos])?;
        let updated = next[pos].clone();
        self.commit(next, self.last_id)?;
        info!(id, "ticket updated");
        Ok(updated)
    }

    pub fn delete(&mut self, id: TicketId) -> StoreResult<RepairTicket> {
        self.ensure_permitted()?;
        let pos = self.position(id)?;
        let mut next = self.tickets.clone();
        let removed = next.remove(pos);
        self.commit(next, self.last_id)?;
        info!(id, "ticket deleted");
        Ok(removed)
    }

    fn position(&self, id: TicketId) -> StoreResult<usize> {
        self.tickets.iter().position(|t| t.id == id).ok_or(StoreError::NotFound(id))
    }

    fn ensure_permitted(&self) -> StoreResult<()> {
        if self.gate.mutations_permitted() { Ok(()) } else { Err(StoreError::Forbidden) }
    }

    // The in-memory table only changes once the backend has the new one.
    fn commit(&mut self, next: Vec<RepairTicket>, last_id: TicketId) -> StoreResult<()> {
        if let Err(e) = self.backend.save(last_id, &next) {
            warn!(location = %self.backend.location(), error = %e, "write failed, change discarded");
            return Err(e);
        }
        self.tickets = next;
        self.last_id = last_id;
        Ok(())
    }
}

/// Raise the counter past every stored id and give id-less rows fresh ids.
fn normalize(mut s: Snapshot) -> StoreResult<Snapshot> {
    let mut seen = HashSet::new();
    let mut last = s.last_id.max(FIRST_TICKET_ID - 1);
    for t in &s.tickets {
        if t.id == 0 { continue; }
        if !seen.insert(t.id) {
            return Err(StoreError::Corrupt(format!("duplicate ticket id {}", t.id)));
        }
        last = last.max(t.id);
    }
    for t in s.tickets.iter_mut().filter(|t| t.id == 0) {
        last = last.checked_add(1).ok_or_else(|| StoreError::Corrupt(format!("no id left for row of {}", t.customer_name)))?;
        warn!(id = last, customer = %t.customer_name, "row without id, assigned a new one");
        t.id = last;
    }
    s.last_id = last;
    Ok(s)
}
