//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{MethodRouter, get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, endpoints,
    logging::logging_middleware,
    not_found::get_404_not_found,
    transaction::{
        TransactionStore, create_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, update_transaction_status_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Each route is registered both with and without its trailing slash.
/// Requests from any origin are allowed.
pub fn build_router<T>(state: AppState<T>) -> Router
where
    T: TransactionStore + Clone + Send + Sync + 'static,
{
    let transactions: MethodRouter<AppState<T>> =
        post(create_transaction_endpoint::<T>).get(list_transactions_endpoint::<T>);
    let transaction: MethodRouter<AppState<T>> =
        get(get_transaction_endpoint::<T>).put(update_transaction_status_endpoint::<T>);

    Router::new()
        .route(endpoints::TRANSACTIONS, transactions.clone())
        .route(endpoints::TRANSACTIONS_NO_SLASH, transactions)
        .route(endpoints::TRANSACTION, transaction.clone())
        .route(endpoints::TRANSACTION_NO_SLASH, transaction)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
