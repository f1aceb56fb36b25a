//! Defines the endpoint for listing a user's transactions.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    transaction::{Transaction, TransactionStore},
};

const STORAGE_ERROR_MESSAGE: &str = "Error retrieving transactions.";

/// The query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// The user whose transactions to list.
    pub user_id: Option<String>,
}

/// The response body for listing transactions.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionList {
    /// The user's transactions, oldest first.
    pub transactions: Vec<Transaction>,
}

/// A route handler for listing every transaction owned by the `user_id` query parameter.
pub async fn list_transactions_endpoint<T>(
    State(state): State<AppState<T>>,
    query: Result<Query<ListTransactionsQuery>, QueryRejection>,
) -> Response
where
    T: TransactionStore,
{
    let user_id = match query {
        Ok(Query(query)) => query.user_id.unwrap_or_default(),
        Err(rejection) => {
            return Error::InvalidQuery(rejection.body_text())
                .into_json_response(STORAGE_ERROR_MESSAGE);
        }
    };
    tracing::debug!("Listing transactions for user {user_id:?}");

    match state.transaction_store.list_by_user(&user_id) {
        Ok(transactions) => Json(TransactionList { transactions }).into_response(),
        Err(error) => {
            tracing::error!("could not list transactions for user {user_id:?}: {error}");
            error.into_json_response(STORAGE_ERROR_MESSAGE)
        }
    }
}
