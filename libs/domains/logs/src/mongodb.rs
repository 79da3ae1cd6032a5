//! MongoDB implementation of LogRepository

use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::LogResult;
use crate::models::{LogEntry, LogFilter, LogPayload, to_bson_datetime, uuid_to_bson};
use crate::repository::LogRepository;

pub const LOGS_COLLECTION: &str = "logs";

pub const CREATED_AT_INDEX: &str = "createdAt_-1";

/// MongoDB implementation of the LogRepository
///
/// Documents are handled untyped since a log body has no fixed schema.
#[derive(Clone)]
pub struct MongoLogRepository {
    collection: Collection<Document>,
}

impl MongoLogRepository {
    pub fn new(db: Database) -> Self {
        Self::with_collection(db, LOGS_COLLECTION)
    }

    pub fn with_collection(db: Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<Document>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }

    /// Ensure the descending `createdAt` index used by listings
    #[instrument(skip(self), fields(collection = %self.collection.name()))]
    pub async fn init_indexes(&self) -> LogResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "createdAt": -1 })
            .options(
                IndexOptions::builder()
                    .name(CREATED_AT_INDEX.to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        tracing::info!("Log indexes ready");
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": uuid_to_bson(id) }
    }
}

#[async_trait]
impl LogRepository for MongoLogRepository {
    #[instrument(skip(self, entry), fields(log_id = %entry.id))]
    async fn insert(&self, entry: LogEntry) -> LogResult<LogEntry> {
        self.collection.insert_one(entry.to_document()?).await?;
        tracing::info!("Log created");
        Ok(entry)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> LogResult<Option<LogEntry>> {
        self.collection
            .find_one(Self::id_filter(id))
            .await?
            .map(LogEntry::from_document)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: LogFilter) -> LogResult<Vec<LogEntry>> {
        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .build();

        let docs: Vec<Document> = self
            .collection
            .find(doc! {})
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        docs.into_iter().map(LogEntry::from_document).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self) -> LogResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    #[instrument(skip(self, fields))]
    async fn merge(&self, id: Uuid, fields: LogPayload) -> LogResult<Option<LogEntry>> {
        let mut set = Document::new();
        for (key, value) in &fields.0 {
            set.insert(key.clone(), bson::to_bson(value)?);
        }
        set.insert("updatedAt", to_bson_datetime(Utc::now()));

        let updated = self
            .collection
            .find_one_and_update(Self::id_filter(id), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;

        if updated.is_some() {
            tracing::info!("Log updated");
        }
        updated.map(LogEntry::from_document).transpose()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> LogResult<bool> {
        let result = self.collection.delete_one(Self::id_filter(id)).await?;

        if result.deleted_count > 0 {
            tracing::info!("Log deleted");
        }
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{Bson, spec::BinarySubtype};

    #[test]
    fn test_id_filter_uses_binary_uuid() {
        let id = Uuid::now_v7();
        let filter = MongoLogRepository::id_filter(id);

        match filter.get("_id") {
            Some(Bson::Binary(bin)) => {
                assert_eq!(bin.subtype, BinarySubtype::Uuid);
                assert_eq!(bin.bytes, id.as_bytes().to_vec());
            }
            other => panic!("unexpected _id filter: {:?}", other),
        }
    }
}
