//! Epoch synchronization: a counting admission gate and a rendezvous barrier
//! whose party count can shrink while an epoch is running.

use crate::error::SearchError;
use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug)]
struct GateState {
    permits: usize,
    closed: bool,
}

/// Counting gate bounding how many traversals are admitted at once.
///
/// Workers take one permit per task and return it early only on collision;
/// the orchestrator tops the gate back up to capacity between epochs.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    state: Mutex<GateState>,
    available: Condvar,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(GateState {
                permits: capacity,
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Block until a permit is free. Fails once the gate is closed.
    pub fn acquire(&self) -> Result<(), SearchError> {
        let mut state = self.lock()?;
        while state.permits == 0 && !state.closed {
            state = self
                .available
                .wait(state)
                .map_err(|_| SearchError::LockPoisoned("admission gate"))?;
        }
        if state.closed {
            return Err(SearchError::PermitAcquisition(
                "admission gate closed".to_string(),
            ));
        }
        state.permits -= 1;
        Ok(())
    }

    /// Return one permit, never exceeding capacity.
    pub fn release(&self) -> Result<(), SearchError> {
        let mut state = self.lock()?;
        state.permits = (state.permits + 1).min(self.capacity);
        self.available.notify_one();
        Ok(())
    }

    /// Refill to full capacity.
    pub fn replenish(&self) -> Result<(), SearchError> {
        let mut state = self.lock()?;
        state.permits = self.capacity;
        self.available.notify_all();
        Ok(())
    }

    /// Wake every waiter and fail all later acquisitions.
    pub fn close(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.closed = true;
        }
        self.available.notify_all();
    }

    #[cfg(test)]
    fn available_permits(&self) -> usize {
        self.state.lock().map(|s| s.permits).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, GateState>, SearchError> {
        self.state
            .lock()
            .map_err(|_| SearchError::LockPoisoned("admission gate"))
    }
}

#[derive(Debug)]
struct BarrierState {
    parties: usize,
    arrived: usize,
    generation: u64,
    broken: bool,
}

impl BarrierState {
    fn trip(&mut self) {
        self.arrived = 0;
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Wait-for-N rendezvous reset by the orchestrator at the start of each epoch.
///
/// A party may leave without waiting ([`EpochBarrier::arrive_and_deregister`]);
/// the barrier then trips as soon as every remaining party has arrived.
#[derive(Debug)]
pub struct EpochBarrier {
    state: Mutex<BarrierState>,
    tripped: Condvar,
}

impl EpochBarrier {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BarrierState {
                parties: 0,
                arrived: 0,
                generation: 0,
                broken: false,
            }),
            tripped: Condvar::new(),
        }
    }

    /// Start a new round with `parties` participants.
    ///
    /// Must not be called while anyone is waiting on the current round.
    pub fn reset(&self, parties: usize) -> Result<(), SearchError> {
        let mut state = self.lock()?;
        if state.broken {
            return Err(SearchError::Rendezvous("barrier is broken".to_string()));
        }
        state.parties = parties;
        state.arrived = 0;
        Ok(())
    }

    /// Arrive and block until every registered party has arrived.
    pub fn arrive_and_wait(&self) -> Result<(), SearchError> {
        let mut state = self.lock()?;
        if state.broken {
            return Err(SearchError::Rendezvous("barrier is broken".to_string()));
        }

        let generation = state.generation;
        state.arrived += 1;
        if state.arrived >= state.parties {
            state.trip();
            self.tripped.notify_all();
            return Ok(());
        }

        while state.generation == generation && !state.broken {
            state = self
                .tripped
                .wait(state)
                .map_err(|_| SearchError::LockPoisoned("epoch barrier"))?;
        }

        if state.generation == generation {
            return Err(SearchError::Rendezvous(
                "barrier broken while waiting".to_string(),
            ));
        }
        Ok(())
    }

    /// Leave the current round without waiting for the others.
    pub fn arrive_and_deregister(&self) -> Result<(), SearchError> {
        let mut state = self.lock()?;
        state.parties = state.parties.saturating_sub(1);
        if state.parties > 0 && state.arrived >= state.parties {
            state.trip();
            self.tripped.notify_all();
        }
        Ok(())
    }

    /// Release every waiter with an error; later rounds fail too.
    pub fn break_barrier(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.broken = true;
        }
        self.tripped.notify_all();
    }

    #[cfg(test)]
    fn parties(&self) -> usize {
        self.state.lock().map(|s| s.parties).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, BarrierState>, SearchError> {
        self.state
            .lock()
            .map_err(|_| SearchError::LockPoisoned("epoch barrier"))
    }
}

impl Default for EpochBarrier {
    fn default() -> Self {
        Self::new()
    }
}
