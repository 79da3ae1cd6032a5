use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::LogResult;
use crate::models::{LogEntry, LogFilter, LogPayload};

/// Repository trait for log persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn insert(&self, entry: LogEntry) -> LogResult<LogEntry>;

    async fn find_by_id(&self, id: Uuid) -> LogResult<Option<LogEntry>>;

    /// List logs, newest first
    async fn list(&self, filter: LogFilter) -> LogResult<Vec<LogEntry>>;

    async fn count(&self) -> LogResult<u64>;

    /// Merge top-level fields into a stored log; `None` when it does not exist
    async fn merge(&self, id: Uuid, fields: LogPayload) -> LogResult<Option<LogEntry>>;

    /// `false` when nothing matched
    async fn delete(&self, id: Uuid) -> LogResult<bool>;
}

/// In-memory implementation of LogRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryLogRepository {
    logs: Arc<RwLock<HashMap<Uuid, LogEntry>>>,
}

impl InMemoryLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LogRepository for InMemoryLogRepository {
    async fn insert(&self, entry: LogEntry) -> LogResult<LogEntry> {
        self.logs.write().await.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn find_by_id(&self, id: Uuid) -> LogResult<Option<LogEntry>> {
        Ok(self.logs.read().await.get(&id).cloned())
    }

    async fn list(&self, filter: LogFilter) -> LogResult<Vec<LogEntry>> {
        let logs = self.logs.read().await;
        let mut entries: Vec<LogEntry> = logs.values().cloned().collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(entries
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> LogResult<u64> {
        Ok(self.logs.read().await.len() as u64)
    }

    async fn merge(&self, id: Uuid, fields: LogPayload) -> LogResult<Option<LogEntry>> {
        let mut logs = self.logs.write().await;
        Ok(logs.get_mut(&id).map(|entry| {
            entry.merge(fields);
            entry.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> LogResult<bool> {
        Ok(self.logs.write().await.remove(&id).is_some())
    }
}
