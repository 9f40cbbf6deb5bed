use std::fmt::{Display, Formatter};

use lmdb::Error as LmdbError;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

/// Outcome envelope shared by the typed API (as the error type) and the FFI
/// layer (serialized to JSON for the host).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppResponse {
    StorageFailure(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    RemoteQueryFailure(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::StorageFailure(msg) => write!(f, "Storage failure: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::RemoteQueryFailure(msg) => write!(f, "Remote query failure: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl std::error::Error for AppResponse {}

impl From<LmdbError> for AppResponse {
    fn from(err: LmdbError) -> Self {
        match err {
            LmdbError::MapFull => {
                AppResponse::StorageFailure("Device store is full (map size exhausted)".to_string())
            }
            LmdbError::Corrupted | LmdbError::Panic => {
                AppResponse::StorageFailure(format!("Device store is corrupted: {}", err))
            }
            _ => AppResponse::StorageFailure(format!("LMDB error: {}", err)),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for AppResponse {
    fn from(err: std::io::Error) -> Self {
        AppResponse::StorageFailure(format!("IO error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    /// True for the kinds the UI should surface as an alert rather than a
    /// silent fallback.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            AppResponse::ValidationError(_)
                | AppResponse::StorageFailure(_)
                | AppResponse::RemoteQueryFailure(_)
        )
    }
}
