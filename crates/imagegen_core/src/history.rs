use std::collections::HashMap;

use engine_logging::engine_debug;

use crate::{EntryId, HistoryEntry, HistoryLimit, OwnerId};

/// A history fetch to run against the store. `ticket` orders completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub ticket: u64,
    pub owner: Option<OwnerId>,
    pub limit: HistoryLimit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { count: usize },
    /// A newer refresh has already been applied.
    Stale,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    AlreadyAbsent,
    Failed(String),
}

/// Local, most-recent-first view of the owner's history.
///
/// Only `apply_refresh`, `apply_append` and `apply_remove` mutate `items`.
/// Deletions acknowledged by the store are remembered as tombstones until a
/// refresh issued after the acknowledgement lands, so a refresh that raced
/// the delete cannot bring the entry back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryCache {
    items: Vec<HistoryEntry>,
    limit: HistoryLimit,
    issued: u64,
    applied: u64,
    tombstones: HashMap<EntryId, u64>,
}

impl HistoryCache {
    pub fn new(limit: HistoryLimit) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[HistoryEntry] {
        &self.items
    }

    /// True while a refresh newer than `ticket` is still outstanding.
    pub fn is_superseded(&self, ticket: u64) -> bool {
        ticket < self.issued
    }

    pub fn find(&self, id: &str) -> Option<&HistoryEntry> {
        self.items.iter().find(|entry| entry.id == id)
    }

    pub fn begin_refresh(&mut self, owner: Option<OwnerId>) -> HistoryQuery {
        self.issued += 1;
        HistoryQuery {
            ticket: self.issued,
            owner,
            limit: self.limit,
        }
    }

    pub fn apply_refresh(
        &mut self,
        ticket: u64,
        result: Result<Vec<HistoryEntry>, String>,
    ) -> RefreshOutcome {
        if ticket <= self.applied {
            engine_debug!(
                "Discarding history refresh {} (already applied {})",
                ticket,
                self.applied
            );
            return RefreshOutcome::Stale;
        }

        let mut entries = match result {
            Ok(entries) => entries,
            Err(reason) if ticket < self.issued => {
                engine_debug!(
                    "Ignoring failure of superseded history refresh {}: {}",
                    ticket,
                    reason
                );
                return RefreshOutcome::Stale;
            }
            Err(reason) => return RefreshOutcome::Failed(reason),
        };

        entries.retain(|entry| !self.tombstones.contains_key(&entry.id));
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(max) = self.limit.as_option() {
            entries.truncate(max);
        }

        self.items = entries;
        self.applied = ticket;
        self.tombstones.retain(|_, acked_at| *acked_at >= ticket);
        RefreshOutcome::Applied {
            count: self.items.len(),
        }
    }

    /// Handles the store's answer to an insert. On success the cache is not
    /// spliced; the returned query re-reads the store so `id` and
    /// `created_at` come from the server.
    pub fn apply_append(
        &mut self,
        owner: Option<OwnerId>,
        result: Result<HistoryEntry, String>,
    ) -> Result<HistoryQuery, String> {
        result.map(|_| self.begin_refresh(owner))
    }

    pub fn apply_remove(&mut self, id: &str, result: Result<(), String>) -> RemoveOutcome {
        if let Err(reason) = result {
            return RemoveOutcome::Failed(reason);
        }

        self.tombstones.insert(id.to_owned(), self.issued);
        let before = self.items.len();
        self.items.retain(|entry| entry.id != id);
        if self.items.len() < before {
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::AlreadyAbsent
        }
    }

    /// Forgets everything, e.g. when the owner changes. Refreshes already in
    /// flight become stale.
    pub fn reset(&mut self) {
        self.items.clear();
        self.tombstones.clear();
        self.applied = self.issued;
    }
}
