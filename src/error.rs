//! Error taxonomy for the posts service and its HTTP mapping.
//!
//! Every failure answers with an empty body; only the status code tells the
//! client what went wrong.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::params::ParamError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failures coming out of the storage engine.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to acquire session: {0}")]
    Acquire(#[from] diesel::r2d2::PoolError),

    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
}

/// Raised when handing a session back to the factory fails. Only ever logged.
#[derive(Debug, Error)]
pub enum SessionReleaseError {
    #[error("connection was broken when released")]
    Broken,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no route for path {0}")]
    UnknownRoute(String),

    #[error(transparent)]
    Validation(#[from] ParamError),

    #[error("post not found")]
    NotFound,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("request task failed: {0}")]
    Task(String),
}

impl From<diesel::result::Error> for ApiError {
    fn from(err: diesel::result::Error) -> Self {
        ApiError::Storage(StorageError::Query(err))
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownRoute(_) | ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Server-side failures are the only ones worth an operator's attention.
    pub fn should_log(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.status_code().into_response()
    }
}
