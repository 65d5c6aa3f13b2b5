//! # Error Handling for Query Endpoints
//!
//! Every failure the engine can produce is an [`ApiError`]. The three caller-input
//! kinds map onto the stages of the pipeline:
//!
//! - **Decode**: a query-string value could not be coerced to the column's logical
//!   type, or an operator/mode literal is not one of the supported names.
//! - **QueryPlan**: an unknown sort column, a malformed sort direction, or an
//!   invalid `limit`/`offset`.
//! - **Relationship**: a requested relationship that the table does not declare.
//!
//! None of these are retried. Database failures are logged with `tracing` and
//! reported to the client with a generic message only.
//!
//! ```rust,ignore
//! async fn handler() -> Result<Json<ListResponse>, ApiError> {
//!     let response = engine.list("account", &params).await?;
//!     Ok(Json(response))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 422 Unprocessable Entity - a parameter value or literal could not be decoded
    Decode {
        /// Query-string key that failed (e.g. `id____from`)
        parameter: String,
        /// User-facing description of the problem
        message: String,
    },

    /// 400 Bad Request - sorting or pagination cannot be planned
    QueryPlan {
        /// User-facing error message
        message: String,
    },

    /// 400 Bad Request - relationship is not declared on the table
    Relationship {
        /// Requested relationship name
        name: String,
        /// Table the relationship was requested on
        table: String,
    },

    /// 404 Not Found - single-row lookup matched nothing
    NotFound {
        /// Resource type (table name)
        resource: String,
        /// Optional ID that wasn't found
        id: Option<String>,
    },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },

    /// 500 Internal Server Error - Generic internal error
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },
}

impl ApiError {
    /// Create a decode error for a single query-string parameter
    ///
    /// # Example
    /// ```rust,ignore
    /// return Err(ApiError::decode("id____from", "expected an integer"));
    /// ```
    pub fn decode(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a query planning error
    pub fn query_plan(message: impl Into<String>) -> Self {
        Self::QueryPlan {
            message: message.into(),
        }
    }

    /// Create an error for a relationship that `table` does not declare
    pub fn relationship(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self::Relationship {
            name: name.into(),
            table: table.into(),
        }
    }

    /// Create a 404 Not Found error
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    /// Create a 500 Internal Server Error from a database error
    ///
    /// The database error details are logged but NOT sent to the user.
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    /// Create a 500 Internal Server Error with optional details
    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    /// True for errors caused by the caller's input (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::QueryPlan { .. } | Self::Relationship { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the user-facing error message (sanitized)
    fn user_message(&self) -> String {
        match self {
            Self::Decode { parameter, message } => {
                format!("Invalid value for '{parameter}': {message}")
            }
            Self::QueryPlan { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. } => message.clone(),
            Self::Relationship { name, table } => {
                format!("'{table}' has no relationship named '{name}'")
            }
            Self::NotFound { resource, id } => {
                if let Some(id) = id {
                    format!("{resource} with ID '{id}' not found")
                } else {
                    format!("{resource} not found")
                }
            }
        }
    }

    /// Log internal error details (not sent to user)
    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "Internal error occurred");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "API error"
                );
            }
        }
    }
}

/// Error response sent to users (sanitized)
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database { internal, .. } => Some(internal),
            _ => None,
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::database(err)
    }
}
