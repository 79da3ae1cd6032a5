//! Log Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{LogError, LogResult};
use crate::models::{LogEntry, LogFilter, LogPayload};
use crate::repository::LogRepository;

/// Log service providing business logic operations
pub struct LogService<R: LogRepository> {
    repository: Arc<R>,
}

impl<R: LogRepository> LogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, payload), fields(fields = payload.0.len()))]
    pub async fn create_log(&self, payload: LogPayload) -> LogResult<LogEntry> {
        Self::validate(&payload)?;
        self.repository.insert(LogEntry::new(payload)).await
    }

    #[instrument(skip(self))]
    pub async fn get_log(&self, id: Uuid) -> LogResult<LogEntry> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(LogError::NotFound(id))
    }

    /// Page of logs plus the total count
    #[instrument(skip(self))]
    pub async fn list_logs(&self, filter: LogFilter) -> LogResult<(Vec<LogEntry>, u64)> {
        filter
            .validate()
            .map_err(|e| LogError::Validation(e.to_string()))?;

        let total = self.repository.count().await?;
        let logs = self.repository.list(filter).await?;
        Ok((logs, total))
    }

    #[instrument(skip(self, payload))]
    pub async fn update_log(&self, id: Uuid, payload: LogPayload) -> LogResult<LogEntry> {
        Self::validate(&payload)?;
        self.repository
            .merge(id, payload)
            .await?
            .ok_or(LogError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_log(&self, id: Uuid) -> LogResult<()> {
        if !self.repository.delete(id).await? {
            return Err(LogError::NotFound(id));
        }
        Ok(())
    }

    fn validate(payload: &LogPayload) -> LogResult<()> {
        payload
            .validate()
            .map_err(|e| LogError::Validation(e.to_string()))
    }
}
