use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::models::RecordId;

/// Boxed error used by the query layer, converted at the repository boundary.
pub type DbError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The store, the pool or the blocking worker pool failed. No distinction by cause.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: RecordId },

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn not_found(kind: &'static str, id: RecordId) -> Self {
        Error::NotFound { kind, id }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<DbError> for Error {
    fn from(err: DbError) -> Self {
        Error::DataUnavailable(err.to_string())
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::DataUnavailable(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for Error {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Error::DataUnavailable(err.to_string())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::DataUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let id = RecordId::new();
        assert_eq!(
            Error::not_found("product", id).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::validation("fats", "must not be negative").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::DataUnavailable("closed".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn boxed_query_errors_become_data_unavailable() {
        let err: DbError = "disk I/O error".into();
        match Error::from(err) {
            Error::DataUnavailable(reason) => assert_eq!(reason, "disk I/O error"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
