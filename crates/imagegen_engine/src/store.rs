use std::sync::Mutex;

use chrono::Utc;
use imagegen_core::{HistoryEntry, NewHistoryEntry};

use crate::AuthSession;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("not allowed to write entries for another owner")]
    Forbidden,
    #[error("store request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid store response: {0}")]
    Decode(String),
}

/// Persistent, owner-scoped history records.
///
/// Implementations enforce isolation themselves: a caller can only read and
/// delete rows belonging to the session's owner. Deleting a row that does not
/// exist (or is not visible) succeeds.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    async fn insert(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StoreError>;

    /// Newest first, at most `limit` rows when given.
    async fn select_recent(
        &self,
        owner: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>, StoreError>;

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;
}

/// Process-local store used for anonymous sessions and tests.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    auth: AuthSession,
    rows: Mutex<Vec<HistoryEntry>>,
}

impl InMemoryHistoryStore {
    pub fn new(auth: AuthSession) -> Self {
        Self {
            auth,
            rows: Mutex::new(Vec::new()),
        }
    }

    fn lock_rows(&self) -> std::sync::MutexGuard<'_, Vec<HistoryEntry>> {
        self.rows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn insert(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StoreError> {
        if entry.owner_id != self.auth.owner() {
            return Err(StoreError::Forbidden);
        }
        let mut rows = self.lock_rows();
        // Rows are kept newest first with strictly increasing timestamps.
        let now = Utc::now();
        let created_at = rows.first().map_or(now, |latest| {
            now.max(latest.created_at + chrono::Duration::microseconds(1))
        });
        let row = HistoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: entry.owner_id,
            prompt: entry.prompt,
            image_ref: entry.image_ref,
            created_at,
        };
        rows.insert(0, row.clone());
        Ok(row)
    }

    async fn select_recent(
        &self,
        owner: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>, StoreError> {
        let caller = self.auth.owner();
        if owner != caller.as_deref() {
            return Ok(Vec::new());
        }
        let mut rows: Vec<HistoryEntry> = self
            .lock_rows()
            .iter()
            .filter(|row| row.owner_id.as_deref() == owner)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let caller = self.auth.owner();
        self.lock_rows()
            .retain(|row| !(row.id == id && row.owner_id == caller));
        Ok(())
    }
}
