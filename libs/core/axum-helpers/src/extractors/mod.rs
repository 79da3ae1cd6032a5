//! Custom extractors that reject with the uniform error payload.

pub mod uuid_path;
pub mod validated_body;
pub mod validated_json;

pub use uuid_path::UuidPath;
pub use validated_body::ValidatedBody;
pub use validated_json::ValidatedJson;
