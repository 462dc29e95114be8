use crate::response;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use stockroom_core::prelude::*;

pub const DATABASE_ERROR: &str = "Database error occurred";

/// Any failure leaving a handler. Converted into the envelope by downcasting to the
/// typed errors; everything else is a generic 500.
pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(err) = self.0.downcast_ref::<AssetError>() {
            return match err {
                AssetError::Validation(v) => {
                    response::validation_error(&v.message, v.field.as_deref())
                }
                AssetError::NotFound => response::error("Asset not found", StatusCode::NOT_FOUND),
                AssetError::Forbidden => response::error("Forbidden", StatusCode::FORBIDDEN),
                AssetError::Conflict(_) => response::error_with_cause(
                    "Asset already exists",
                    StatusCode::CONFLICT,
                    err,
                ),
                AssetError::Persistence { context, source } => {
                    response::error_with_cause(context, StatusCode::INTERNAL_SERVER_ERROR, source)
                }
            };
        }

        if let Some(err) = self.0.downcast_ref::<ValidationError>() {
            return response::validation_error(&err.message, err.field.as_deref());
        }

        if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            return match err {
                RepositoryError::Conflict(_) => response::error_with_cause(
                    "Asset already exists",
                    StatusCode::CONFLICT,
                    err,
                ),
                _ => response::error_with_cause(
                    DATABASE_ERROR,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err,
                ),
            };
        }

        if let Some(err) = self.0.downcast_ref::<StorageError>() {
            return match err {
                StorageError::NotFound(_) => {
                    response::error("Image not found", StatusCode::NOT_FOUND)
                }
                StorageError::Forbidden(_) => {
                    response::error_with_cause("Forbidden", StatusCode::FORBIDDEN, err)
                }
                _ => response::error_with_cause(
                    "Storage error occurred",
                    StatusCode::INTERNAL_SERVER_ERROR,
                    err,
                ),
            };
        }

        if let Some(err) = self.0.downcast_ref::<RecordError>() {
            return response::error_with_cause(
                "Record store error occurred",
                StatusCode::INTERNAL_SERVER_ERROR,
                err,
            );
        }

        if let Some(err) = self.0.downcast_ref::<AuthError>() {
            return response::error_with_cause("Unauthorized", StatusCode::UNAUTHORIZED, err);
        }

        response::error_with_cause(
            "Internal Server Error",
            StatusCode::INTERNAL_SERVER_ERROR,
            &*self.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: impl Into<ApiError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn taxonomy_maps_to_statuses() {
        assert_eq!(
            status_of(ValidationError::for_field("name", "name is required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AssetError::from(ValidationError::new("bad"))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(AssetError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AssetError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AssetError::Conflict(Uuid::nil())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(AssetError::Persistence {
                context: "Failed to create asset",
                source: RepositoryError::Closed,
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(RepositoryError::Generic("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(StorageError::NotFound("k".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(StorageError::Forbidden("k".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(AuthError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(anyhow::anyhow!("unexpected")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
