use crate::asset::AssetId;
use thiserror::Error;

/// Malformed, missing or out-of-range client input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    /// The offending input field, when one can be named.
    pub field: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
        }
    }

    pub fn for_field(field: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Duplicate asset id: {0}")]
    Conflict(AssetId),

    #[error("Repository is not open")]
    Closed,

    #[error("Repository backend error: {0}")]
    Generic(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Access denied for path: {0}")]
    Forbidden(String),

    #[error("Storage backend error: {0}")]
    Generic(String),
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Record store error: {0}")]
    Generic(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Authentication provider error: {0}")]
    Generic(String),
}

/// Outcome of an asset operation that did not succeed.
#[derive(Error, Debug)]
pub enum AssetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Asset not found")]
    NotFound,

    #[error("Forbidden")]
    Forbidden,

    #[error("Asset already exists")]
    Conflict(AssetId),

    /// `context` is the only part shown to clients.
    #[error("{context}")]
    Persistence {
        context: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl AssetError {
    pub fn persistence(context: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| match source {
            RepositoryError::Conflict(id) => AssetError::Conflict(id),
            source => AssetError::Persistence { context, source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn validation_error_keeps_field() {
        let err = ValidationError::for_field("name", "name is required");
        assert_eq!(err.to_string(), "name is required");
        assert_eq!(err.field.as_deref(), Some("name"));
        assert!(ValidationError::new("bad body").field.is_none());
    }

    #[test]
    fn persistence_context_hides_source() {
        let err = AssetError::persistence("Failed to create asset")(RepositoryError::Generic(
            "connection reset by peer".into(),
        ));
        assert_eq!(err.to_string(), "Failed to create asset");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn repository_conflict_becomes_asset_conflict() {
        let id = Uuid::nil();
        let err = AssetError::persistence("Failed to create asset")(RepositoryError::Conflict(id));
        assert!(matches!(err, AssetError::Conflict(got) if got == id));
    }
}
