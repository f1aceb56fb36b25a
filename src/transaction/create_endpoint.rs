//! Defines the endpoint for creating a new transaction.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    AppState, Error,
    transaction::{Amount, NewTransaction, TransactionStore, TransactionType},
};

const STORAGE_ERROR_MESSAGE: &str = "Error creating transaction.";

/// The JSON body for creating a transaction.
///
/// Fields are loosely typed so that each one can be validated, in order, with
/// its own error message.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionPayload {
    /// The amount as a JSON number or string. It is stored as given.
    pub amount: Option<Value>,
    /// Either "DEPOSIT" or "WITHDRAWAL".
    pub transaction_type: Option<Value>,
    /// The user that owns the transaction.
    pub user: Option<String>,
}

impl TryFrom<CreateTransactionPayload> for NewTransaction {
    type Error = Error;

    fn try_from(payload: CreateTransactionPayload) -> Result<Self, Self::Error> {
        let transaction_type = match &payload.transaction_type {
            Some(Value::String(transaction_type)) => transaction_type.parse::<TransactionType>()?,
            Some(other) => return Err(Error::InvalidTransactionType(other.to_string())),
            None => return Err(Error::InvalidTransactionType(String::new())),
        };

        let amount = match payload.amount {
            Some(Value::Number(number)) => Amount::Number(number),
            Some(Value::String(text)) => Amount::Text(text),
            Some(other) => {
                return Err(Error::InvalidRequestBody(format!(
                    "amount must be a number or a string, got {other}"
                )));
            }
            None => return Err(Error::MissingField("amount")),
        };

        let user = payload.user.ok_or(Error::MissingField("user"))?;

        Ok(NewTransaction {
            amount,
            transaction_type,
            user,
        })
    }
}

/// A route handler for creating a new `PENDING` transaction.
///
/// Responds with 201 Created and the new transaction, including its owner.
pub async fn create_transaction_endpoint<T>(
    State(state): State<AppState<T>>,
    payload: Result<Json<CreateTransactionPayload>, JsonRejection>,
) -> Response
where
    T: TransactionStore,
{
    let new_transaction = match payload
        .map_err(|rejection| Error::InvalidRequestBody(rejection.body_text()))
        .and_then(|Json(payload)| NewTransaction::try_from(payload))
    {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_json_response(STORAGE_ERROR_MESSAGE),
    };

    match state.transaction_store.create(new_transaction) {
        Ok(transaction) => (StatusCode::CREATED, Json(transaction)).into_response(),
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_json_response(STORAGE_ERROR_MESSAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints,
        test_utils::{get_failing_test_server, get_test_server},
        transaction::{
            Amount, CreatedTransaction, TransactionStatus, TransactionStore, TransactionType,
        },
    };

    #[tokio::test]
    async fn creates_pending_transaction() {
        let (server, store) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "100.50",
                "transaction_type": "DEPOSIT",
                "user": "alice"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created = response.json::<CreatedTransaction>();
        assert!(created.transaction.transaction_id > 0);
        assert_eq!(created.transaction.amount, Amount::from("100.50"));
        assert_eq!(created.transaction.transaction_type, TransactionType::Deposit);
        assert_eq!(created.transaction.status, TransactionStatus::Pending);
        assert!(created.transaction.timestamp.is_some());
        assert_eq!(created.user, "alice");
        assert_eq!(store.count(), Ok(1));
    }

    #[tokio::test]
    async fn response_includes_user_and_wire_strings() {
        let (server, _store) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS_NO_SLASH)
            .json(&json!({
                "amount": -20,
                "transaction_type": "WITHDRAWAL",
                "user": "bob"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["transaction_id"], json!(1));
        assert_eq!(body["amount"], json!(-20));
        assert_eq!(body["transaction_type"], json!("WITHDRAWAL"));
        assert_eq!(body["status"], json!("PENDING"));
        assert_eq!(body["user"], json!("bob"));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn rejects_invalid_transaction_types_without_writing() {
        let (server, store) = get_test_server();

        for transaction_type in [json!("BET"), json!("deposit"), json!(""), json!(1), json!(null)] {
            let response = server
                .post(endpoints::TRANSACTIONS)
                .json(&json!({
                    "amount": 10,
                    "transaction_type": transaction_type,
                    "user": "alice"
                }))
                .await;

            response.assert_status_bad_request();
            response.assert_json(&json!({ "error": "Invalid transaction_type." }));
        }

        assert_eq!(store.count(), Ok(0));
    }

    #[tokio::test]
    async fn transaction_type_is_checked_before_amount() {
        let (server, _store) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "amount": "lots", "transaction_type": "BET" }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Invalid transaction_type." }));
    }

    #[tokio::test]
    async fn stores_non_numeric_amount_as_given() {
        let (server, store) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": "ten",
                "transaction_type": "DEPOSIT",
                "user": "alice"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["amount"], json!("ten"));
        assert_eq!(store.get(1).map(|transaction| transaction.amount), Ok(Amount::from("ten")));
    }

    #[tokio::test]
    async fn rejects_amount_that_is_not_a_number_or_string() {
        let (server, store) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": { "value": 10 },
                "transaction_type": "DEPOSIT",
                "user": "alice"
            }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Invalid request body." }));
        assert_eq!(store.count(), Ok(0));
    }

    #[tokio::test]
    async fn rejects_missing_amount_and_user() {
        let (server, _store) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "transaction_type": "DEPOSIT", "user": "alice" }))
            .await;
        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "amount is required." }));

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "amount": 1, "transaction_type": "DEPOSIT" }))
            .await;
        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "user is required." }));
    }

    #[tokio::test]
    async fn accepts_empty_user() {
        let (server, _store) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "amount": 0, "transaction_type": "DEPOSIT", "user": "" }))
            .await;

        response.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn rejects_malformed_json() {
        let (server, _store) = get_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .text("{\"amount\": ")
            .content_type("application/json")
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Invalid request body." }));
    }

    #[tokio::test]
    async fn storage_fault_returns_generic_message() {
        let server = get_failing_test_server();

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({ "amount": 1, "transaction_type": "DEPOSIT", "user": "alice" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "error": "Error creating transaction." }));
    }
}
