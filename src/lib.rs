//! A small transaction ledger service.
//!
//! Clients create, list, fetch and update the status of deposits and
//! withdrawals that are stored in a local SQLite database. This library
//! provides the store and the JSON REST API that exposes it.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
pub mod endpoints;
mod logging;
mod not_found;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use database_id::TransactionId;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    Amount, CreatedTransaction, NewTransaction, SQLiteTransactionStore, Transaction,
    TransactionStatus, TransactionStore, TransactionType,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate_signal) => {
                terminate_signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The transaction type was not one of `DEPOSIT` or `WITHDRAWAL`.
    #[error("invalid transaction type \"{0}\"")]
    InvalidTransactionType(String),

    /// The status was not a recognised status, or is not allowed for the
    /// operation (e.g., updating a transaction back to `PENDING`).
    #[error("invalid status \"{0}\"")]
    InvalidStatus(String),

    /// A required field was missing from the request body.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The user ID query parameter was missing or empty when listing transactions.
    #[error("user ID is required")]
    MissingUserId,

    /// The request body could not be parsed as JSON of the expected shape.
    ///
    /// The string is the parser's description and is only logged.
    #[error("invalid request body: {0}")]
    InvalidRequestBody(String),

    /// The query string could not be parsed.
    ///
    /// The string is the parser's description and is only logged.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The creation time could not be formatted.
    #[error("could not format timestamp: {0}")]
    TimestampFormat(String),
}

/// The broad classes of [Error], which decide how an error is reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The client sent bad input. Nothing was written.
    Validation,
    /// No transaction with the requested ID exists.
    NotFound,
    /// The database failed. Details are only logged on the server.
    Storage,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidTransactionType(_)
            | Error::InvalidStatus(_)
            | Error::MissingField(_)
            | Error::MissingUserId
            | Error::InvalidRequestBody(_)
            | Error::InvalidQuery(_) => ErrorKind::Validation,
            Error::NotFound => ErrorKind::NotFound,
            Error::SqlError(_) | Error::DatabaseLockError | Error::TimestampFormat(_) => {
                ErrorKind::Storage
            }
        }
    }

    /// Render the error as a JSON `{"error": "..."}` response.
    ///
    /// `storage_message` replaces the error text for storage faults so that
    /// database errors never reach the client.
    pub(crate) fn into_json_response(self, storage_message: &str) -> Response {
        let status = match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            Error::InvalidTransactionType(_) => "Invalid transaction_type.".to_owned(),
            Error::InvalidStatus(_) => "Invalid status value.".to_owned(),
            Error::MissingField(field) => format!("{field} is required."),
            Error::MissingUserId => "User ID is required.".to_owned(),
            Error::InvalidRequestBody(reason) => {
                tracing::debug!("Rejected request body: {reason}");
                "Invalid request body.".to_owned()
            }
            Error::InvalidQuery(reason) => {
                tracing::debug!("Rejected query string: {reason}");
                "Invalid query string.".to_owned()
            }
            Error::NotFound => "Transaction not found.".to_owned(),
            error @ (Error::SqlError(_) | Error::DatabaseLockError | Error::TimestampFormat(_)) => {
                tracing::error!("An unexpected error occurred: {}", error);
                storage_message.to_owned()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_json_response("Internal server error.")
    }
}
