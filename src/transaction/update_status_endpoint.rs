//! Defines the endpoint for moving a transaction to `COMPLETED` or `FAILED`.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    transaction::{TransactionStatus, TransactionStore},
};

const STORAGE_ERROR_MESSAGE: &str = "Error updating transaction.";

/// The JSON body for updating a transaction's status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    /// Either "COMPLETED" or "FAILED".
    pub status: Option<Value>,
}

impl UpdateStatusPayload {
    /// The requested status if it is one a transaction may be updated to.
    fn target_status(&self) -> Result<TransactionStatus, Error> {
        let status = match &self.status {
            Some(Value::String(status)) => status.parse::<TransactionStatus>()?,
            Some(other) => return Err(Error::InvalidStatus(other.to_string())),
            None => return Err(Error::InvalidStatus(String::new())),
        };

        if status.is_final() {
            Ok(status)
        } else {
            Err(Error::InvalidStatus(status.to_string()))
        }
    }
}

/// A route handler for updating the status of a transaction.
///
/// Responds with the full transaction as stored after the update.
pub async fn update_transaction_status_endpoint<T>(
    State(state): State<AppState<T>>,
    path: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<UpdateStatusPayload>, JsonRejection>,
) -> Response
where
    T: TransactionStore,
{
    let status = match payload
        .map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))
        .and_then(|Json(payload)| payload.target_status())
    {
        Ok(status) => status,
        Err(error) => return error.into_json_response(STORAGE_ERROR_MESSAGE),
    };

    // A path segment that is not an integer cannot name a transaction.
    let Ok(Path(transaction_id)) = path else {
        return Error::NotFound.into_json_response(STORAGE_ERROR_MESSAGE);
    };

    match state
        .transaction_store
        .update_status(transaction_id, status)
    {
        Ok(transaction) => Json(transaction).into_response(),
        Err(Error::NotFound) => Error::NotFound.into_json_response(STORAGE_ERROR_MESSAGE),
        Err(error) => {
            tracing::error!("could not update transaction {transaction_id}: {error}");
            error.into_json_response(STORAGE_ERROR_MESSAGE)
        }
    }
}
