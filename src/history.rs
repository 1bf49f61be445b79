//! Bounded back/forward history of loaded graphs.
//!
//! Entries are a cache. When an entry remembers where it came from, it can be
//! reconciled against that origin before it is shown again.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::document::LoadedGraph;
use crate::error::{LoadError, ReconciliationError};
use crate::model::GraphSnapshot;
use crate::source::SnapshotSource;

pub const DEFAULT_CAPACITY: usize = 5;

#[derive(Clone, Debug)]
pub struct NavigationHistory {
    entries: VecDeque<GraphSnapshot>,
    cursor: usize,
    capacity: usize,
}

/// Where an external navigation lands.
#[derive(Clone, Debug, PartialEq)]
pub enum Navigation<'a> {
    Entry(&'a GraphSnapshot),
    /// The index is not in the history; go back to the app's starting graph.
    EntryPoint,
}

#[derive(Debug)]
pub enum Reconciled {
    /// The origin returned a different graph; the entry now holds it.
    Refreshed(GraphSnapshot),
    Unchanged(GraphSnapshot),
    /// Re-fetching failed; the stored snapshot is still usable.
    Stale {
        snapshot: GraphSnapshot,
        error: ReconciliationError,
    },
    Missing,
}

impl Reconciled {
    pub fn snapshot(&self) -> Option<&GraphSnapshot> {
        match self {
            Reconciled::Refreshed(s) | Reconciled::Unchanged(s) => Some(s),
            Reconciled::Stale { snapshot, .. } => Some(snapshot),
            Reconciled::Missing => None,
        }
    }
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl NavigationHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&GraphSnapshot> {
        self.entries.get(self.cursor)
    }

    pub fn get(&self, index: usize) -> Option<&GraphSnapshot> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> impl Iterator<Item = &GraphSnapshot> {
        self.entries.iter()
    }

    pub fn can_go_back(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Drops anything ahead of the cursor, appends, and evicts the oldest
    /// entries past capacity.
    pub fn push(&mut self, snapshot: GraphSnapshot) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        debug!(len = self.entries.len(), cursor = self.cursor, "history push");
    }

    /// `None` at the boundary; the cursor does not move.
    pub fn back(&mut self) -> Option<&GraphSnapshot> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    pub fn forward(&mut self) -> Option<&GraphSnapshot> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn go_to(&mut self, index: usize) -> Navigation<'_> {
        if index >= self.entries.len() {
            info!(index, len = self.entries.len(), "unknown history index, returning to entry point");
            return Navigation::EntryPoint;
        }
        self.cursor = index;
        Navigation::Entry(&self.entries[index])
    }

    pub fn reconcile(&mut self, index: usize, source: &dyn SnapshotSource) -> Reconciled {
        let Some(entry) = self.entries.get(index) else {
            return Reconciled::Missing;
        };
        let Some(origin) = entry.origin.clone() else {
            return Reconciled::Unchanged(entry.clone());
        };
        let fetched = source.fetch(&origin);
        self.reconcile_with(index, &origin, fetched)
    }

    /// Second half of [`reconcile`](Self::reconcile), for callers that
    /// fetched the origin themselves (e.g. on a worker thread). The entry at
    /// `index` must still carry `origin`; loads that truncated or evicted
    /// entries since the fetch was issued make it `Missing`.
    pub fn reconcile_with(
        &mut self,
        index: usize,
        origin: &str,
        fetched: Result<LoadedGraph, LoadError>,
    ) -> Reconciled {
        let Some(entry) = self
            .entries
            .get_mut(index)
            .filter(|e| e.origin.as_deref() == Some(origin))
        else {
            debug!(index, origin, "history entry no longer holds this origin");
            return Reconciled::Missing;
        };
        match fetched {
            Ok(graph) => {
                let fresh = graph.into_snapshot(entry.origin.clone());
                if fresh.same_graph(entry) {
                    Reconciled::Unchanged(entry.clone())
                } else {
                    info!(index, origin = ?entry.origin, "history entry refreshed from origin");
                    *entry = fresh.clone();
                    Reconciled::Refreshed(fresh)
                }
            }
            Err(cause) => {
                let error = ReconciliationError {
                    index,
                    origin: entry.origin.clone().unwrap_or_default(),
                    cause,
                };
                warn!(%error, "replaying stored snapshot");
                Reconciled::Stale {
                    snapshot: entry.clone(),
                    error,
                }
            }
        }
    }
}
