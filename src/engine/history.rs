//! Snapshot-based undo/redo over the whole ledger.

use std::fmt;

use tracing::{debug, info};

use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;

/// Callback run with the new current snapshot after every commit, undo or redo.
pub type Listener = Box<dyn FnMut(&Snapshot)>;

/// An immutable copy of the ledger as it stood after one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    revision: u64,
    ledger: Ledger,
}

impl Snapshot {
    /// Monotonic commit counter; the seed snapshot is revision 0.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

/// Linear sequence of snapshots with a cursor.
///
/// The sequence is never empty and `current` always indexes into it. `commit`
/// drops everything after the cursor before appending, so a new edit after an
/// undo discards the redo branch.
pub struct History {
    snapshots: Vec<Snapshot>,
    current: usize,
    next_revision: u64,
    listeners: Vec<Listener>,
}

impl History {
    pub fn new(seed: Ledger) -> Self {
        Self {
            snapshots: vec![Snapshot {
                revision: 0,
                ledger: seed,
            }],
            current: 0,
            next_revision: 1,
            listeners: Vec::new(),
        }
    }

    pub fn current(&self) -> &Ledger {
        self.current_snapshot().ledger()
    }

    pub fn current_snapshot(&self) -> &Snapshot {
        &self.snapshots[self.current]
    }

    /// A private copy of the current ledger for a command to mutate before committing.
    pub fn working_copy(&self) -> Ledger {
        self.current().clone()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.snapshots.len()
    }

    /// Records `ledger` as the newest state and returns its revision.
    pub fn commit(&mut self, ledger: Ledger) -> u64 {
        let discarded = self.snapshots.len() - (self.current + 1);
        self.snapshots.truncate(self.current + 1);
        let revision = self.next_revision;
        self.next_revision += 1;
        self.snapshots.push(Snapshot { revision, ledger });
        self.current = self.snapshots.len() - 1;
        if discarded > 0 {
            debug!(discarded, "dropped redo branch");
        }
        info!(revision, index = self.current, "committed ledger snapshot");
        self.notify();
        revision
    }

    pub fn undo(&mut self) -> Result<&Ledger> {
        if !self.can_undo() {
            return Err(LedgerError::NoUndoableState);
        }
        self.current -= 1;
        info!(index = self.current, "undo");
        self.notify();
        Ok(self.current())
    }

    pub fn redo(&mut self) -> Result<&Ledger> {
        if !self.can_redo() {
            return Err(LedgerError::NoRedoableState);
        }
        self.current += 1;
        info!(index = self.current, "redo");
        self.notify();
        Ok(self.current())
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Snapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self) {
        let snapshot = &self.snapshots[self.current];
        for listener in self.listeners.iter_mut() {
            listener(snapshot);
        }
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("snapshots", &self.snapshots.len())
            .field("current", &self.current)
            .field("next_revision", &self.next_revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
