//! Error types for the store, the user service and the HTTP boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure reported by a [`UserStore`](crate::users::repo::UserStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint (the email index) rejected the write.
    #[error("{0}")]
    UniqueViolation(String),

    /// The store could not be reached.
    #[error("{0}")]
    Unavailable(String),

    /// Any other query failure.
    #[error("{0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::UniqueViolation(db.message().to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            _ => StoreError::Query(err.to_string()),
        }
    }
}

/// Outcome taxonomy of a user operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),

    /// The body could not be decoded; carries the decoder's description.
    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("User with this email already exists")]
    Conflict,

    #[error("User with ID {0} not found")]
    NotFound(i32),

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for UserError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(msg) | StoreError::Query(msg) => UserError::Internal(msg),
            StoreError::Unavailable(msg) => UserError::Unavailable(msg),
        }
    }
}

impl UserError {
    /// Raw description as reported to the client in the `error` field.
    fn detail(&self) -> String {
        match self {
            UserError::Unavailable(msg)
            | UserError::Internal(msg)
            | UserError::Validation(msg)
            | UserError::InvalidBody(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

/// Which endpoint failed; the same error renders differently per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    List,
    Update,
    Delete,
}

impl Operation {
    fn failure_message(self) -> &'static str {
        match self {
            Operation::Create => "Error creating user",
            Operation::List => "Error listing users",
            Operation::Update => "Error updating user",
            Operation::Delete => "Error deleting user",
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub operation: Operation,
    pub error: UserError,
}

impl ApiError {
    pub fn new(operation: Operation, error: UserError) -> Self {
        Self { operation, error }
    }

    pub fn status(&self) -> StatusCode {
        match (&self.error, self.operation) {
            (UserError::Conflict, _) => StatusCode::CONFLICT,
            (UserError::NotFound(_), _) => StatusCode::NOT_FOUND,
            (_, Operation::List) => StatusCode::SERVICE_UNAVAILABLE,
            // missing create fields deliberately stay a server error
            (UserError::Validation(_) | UserError::InvalidBody(_), Operation::Create) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            (UserError::Validation(_) | UserError::InvalidBody(_), _) => StatusCode::BAD_REQUEST,
            (UserError::Unavailable(_) | UserError::Internal(_), _) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match (&self.error, self.operation) {
            (UserError::Conflict | UserError::NotFound(_), _) => {
                json!({ "message": self.error.to_string() })
            }
            (_, Operation::List) => json!({ "error": "Database unavailable" }),
            (UserError::Validation(msg), Operation::Update) => json!({ "message": msg }),
            (UserError::InvalidBody(detail), Operation::Update) => json!({
                "message": self.error.to_string(),
                "error": detail,
            }),
            (err, op) => json!({
                "message": op.failure_message(),
                "error": err.detail(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Framework-level rejection (unrouted path, bad id segment, wrong method).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    NotFound,
    MethodNotAllowed,
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            RouteError::NotFound => (StatusCode::NOT_FOUND, "Not Found"),
            RouteError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
