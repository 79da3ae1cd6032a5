use chrono::{DateTime, Utc};
use mongodb::bson::{self, Binary, Bson, Document, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{LogError, LogResult};

/// Keys managed by the service; a payload may not set them.
pub const RESERVED_KEYS: [&str; 4] = ["_id", "id", "createdAt", "updatedAt"];

/// A log record: caller-supplied fields plus system-managed id and timestamps.
///
/// Serialized flat, e.g. `{ "id": ..., "action": "open", "createdAt": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: Uuid,
    #[serde(flatten)]
    pub body: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(payload: LogPayload) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            body: payload.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the top-level fields present in `payload`, keep the rest.
    pub fn merge(&mut self, payload: LogPayload) {
        self.body.extend(payload.0);
        self.updated_at = Utc::now();
    }

    /// Storage form: body fields at the top level next to `_id`,
    /// `createdAt` and `updatedAt`.
    pub fn to_document(&self) -> LogResult<Document> {
        let mut doc = Document::new();
        doc.insert("_id", uuid_to_bson(self.id));
        for (key, value) in &self.body {
            doc.insert(key.clone(), bson::to_bson(value)?);
        }
        doc.insert("createdAt", to_bson_datetime(self.created_at));
        doc.insert("updatedAt", to_bson_datetime(self.updated_at));
        Ok(doc)
    }

    pub fn from_document(mut doc: Document) -> LogResult<Self> {
        let id = match doc.remove("_id") {
            Some(value) => uuid_from_bson(&value)?,
            None => return Err(LogError::Malformed("missing _id".to_string())),
        };
        let created_at = take_datetime(&mut doc, "createdAt")?;
        let updated_at = take_datetime(&mut doc, "updatedAt")?;

        let body = doc
            .into_iter()
            .map(|(key, value)| (key, value.into_relaxed_extjson()))
            .collect();

        Ok(Self {
            id,
            body,
            created_at,
            updated_at,
        })
    }
}

pub(crate) fn uuid_to_bson(id: Uuid) -> Bson {
    Bson::Binary(Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.as_bytes().to_vec(),
    })
}

fn uuid_from_bson(value: &Bson) -> LogResult<Uuid> {
    match value {
        Bson::Binary(bin) if bin.subtype == BinarySubtype::Uuid => Uuid::from_slice(&bin.bytes)
            .map_err(|e| LogError::Malformed(format!("_id: {}", e))),
        Bson::String(s) => {
            Uuid::parse_str(s).map_err(|e| LogError::Malformed(format!("_id: {}", e)))
        }
        other => Err(LogError::Malformed(format!(
            "_id has unexpected type {:?}",
            other.element_type()
        ))),
    }
}

pub(crate) fn to_bson_datetime(dt: DateTime<Utc>) -> Bson {
    Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis()))
}

fn take_datetime(doc: &mut Document, key: &str) -> LogResult<DateTime<Utc>> {
    match doc.remove(key) {
        Some(Bson::DateTime(dt)) => DateTime::from_timestamp_millis(dt.timestamp_millis())
            .ok_or_else(|| LogError::Malformed(format!("{} out of range", key))),
        _ => Err(LogError::Malformed(format!("missing {}", key))),
    }
}

/// Caller-supplied log body: any non-empty JSON object without reserved keys.
///
/// Top-level keys are stored verbatim as document fields, so they may not
/// start with `$` or contain `.`; an update would read those as operators
/// or paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct LogPayload(pub BTreeMap<String, Value>);

impl Validate for LogPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let error = if self.0.is_empty() {
            ValidationError::new("empty").with_message("log body must not be empty".into())
        } else if let Some(key) = RESERVED_KEYS.iter().find(|k| self.0.contains_key(**k)) {
            ValidationError::new("reserved_key")
                .with_message(format!("'{}' is managed by the server", key).into())
        } else if let Some(key) = self.0.keys().find(|k| !is_plain_key(k)) {
            ValidationError::new("invalid_key").with_message(
                format!("'{}' is not a valid field name", key).into(),
            )
        } else {
            return Ok(());
        };

        let mut errors = ValidationErrors::new();
        errors.add("body", error);
        Err(errors)
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && !key.starts_with('$') && !key.contains('.')
}

/// Paging for log listings
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogFilter {
    /// Maximum number of results, 1 to 200
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: i64,
    /// Number of results to skip
    #[serde(default)]
    pub offset: u64,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

fn default_limit() -> i64 {
    50
}
