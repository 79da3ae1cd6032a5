use mongodb::Collection;
use mongodb::error::{Error, ErrorKind, WriteFailure};
use tracing::debug;

/// Server code for a unique index violation.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

const NAMESPACE_NOT_FOUND_CODE: i32 = 26;
const INDEX_NOT_FOUND_CODE: i32 = 27;

/// Server error code carried by a command or single-write failure.
pub fn server_error_code(err: &Error) -> Option<i32> {
    match err.kind.as_ref() {
        ErrorKind::Command(e) => Some(e.code),
        ErrorKind::Write(WriteFailure::WriteError(e)) => Some(e.code),
        _ => None,
    }
}

/// Name of the unique index a duplicate-key error refers to.
pub fn duplicate_key_index(err: &Error) -> Option<String> {
    if server_error_code(err) != Some(DUPLICATE_KEY_CODE) {
        return None;
    }

    let message = match err.kind.as_ref() {
        ErrorKind::Command(e) => &e.message,
        ErrorKind::Write(WriteFailure::WriteError(e)) => &e.message,
        _ => return None,
    };

    parse_duplicate_key_index(message)
}

/// Pulls `userId_1` out of
/// `E11000 duplicate key error collection: app.users index: userId_1 dup key: { ... }`.
pub fn parse_duplicate_key_index(message: &str) -> Option<String> {
    let (_, after) = message.split_once("index: ")?;
    after
        .split_whitespace()
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Whether `err` means the collection or index does not exist.
pub fn is_missing_namespace_or_index(err: &Error) -> bool {
    matches!(
        server_error_code(err),
        Some(NAMESPACE_NOT_FOUND_CODE | INDEX_NOT_FOUND_CODE)
    )
}

/// Drop the index called `name`.
///
/// Returns `Ok(false)` when the index or its collection does not exist.
pub async fn drop_index_if_exists<T>(collection: &Collection<T>, name: &str) -> Result<bool, Error>
where
    T: Send + Sync,
{
    match collection.drop_index(name).await {
        Ok(()) => {
            debug!(collection = collection.name(), index = name, "Dropped index");
            Ok(true)
        }
        Err(e) if is_missing_namespace_or_index(&e) => {
            debug!(collection = collection.name(), index = name, "Index not present, nothing to drop");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
