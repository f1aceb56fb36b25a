//! Defines the endpoint for fetching a single transaction.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    response::{IntoResponse, Response},
};

use crate::{AppState, Error, database_id::TransactionId, transaction::TransactionStore};

const STORAGE_ERROR_MESSAGE: &str = "Error retrieving transaction.";

/// A route handler for getting a transaction by its ID.
///
/// Responds with 404 if there is no such transaction.
pub async fn get_transaction_endpoint<T>(
    State(state): State<AppState<T>>,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Response
where
    T: TransactionStore,
{
    let Ok(Path(transaction_id)) = path else {
        return Error::NotFound.into_json_response(STORAGE_ERROR_MESSAGE);
    };

    match state.transaction_store.get(transaction_id) {
        Ok(transaction) => Json(transaction).into_response(),
        Err(Error::NotFound) => Error::NotFound.into_json_response(STORAGE_ERROR_MESSAGE),
        Err(error) => {
            tracing::error!("could not get transaction {transaction_id}: {error}");
            error.into_json_response(STORAGE_ERROR_MESSAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::{create_test_transaction, get_failing_test_server, get_test_server},
        transaction::{CreatedTransaction, Transaction, TransactionStatus, TransactionType},
    };

    #[tokio::test]
    async fn gets_created_transaction() {
        let (server, store) = get_test_server();
        let created = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "100.50",
                "transaction_type": "DEPOSIT",
                "user": "alice"
            }))
            .await
            .json::<CreatedTransaction>();

        let response = server
            .get(&format_endpoint(
                endpoints::TRANSACTION,
                created.transaction.transaction_id,
            ))
            .await;

        response.assert_status_ok();
        let got = response.json::<Transaction>();
        assert_eq!(got.transaction_id, created.transaction.transaction_id);
        assert_eq!(got.amount.as_f64(), Some(100.5));
        assert_eq!(got.transaction_type, TransactionType::Deposit);
        assert_eq!(got.status, TransactionStatus::Pending);
        assert_eq!(store.count(), Ok(1));
    }

    #[tokio::test]
    async fn works_without_trailing_slash() {
        let (server, store) = get_test_server();
        let id = create_test_transaction(&store, 1.0, TransactionType::Withdrawal, "bob")
            .transaction
            .transaction_id;

        let response = server
            .get(&format_endpoint(endpoints::TRANSACTION_NO_SLASH, id))
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["transaction_type"], json!("WITHDRAWAL"));
        assert!(body.get("user").is_none());
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (server, _store) = get_test_server();

        let response = server
            .get(&format_endpoint(endpoints::TRANSACTION, 12345))
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({ "error": "Transaction not found." }));
    }

    #[tokio::test]
    async fn non_integer_id_is_not_found() {
        let (server, _store) = get_test_server();

        let response = server.get("/api/transactions/latest/").await;

        response.assert_status_not_found();
        response.assert_json(&json!({ "error": "Transaction not found." }));
    }

    #[tokio::test]
    async fn storage_fault_returns_generic_message() {
        let server = get_failing_test_server();

        let response = server
            .get(&format_endpoint(endpoints::TRANSACTION, 1))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "error": "Error retrieving transaction." }));
    }
}
